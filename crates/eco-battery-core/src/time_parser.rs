// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Eco Battery.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Remaining-time parsing for loosely formatted sensor values.
//!
//! Battery vendors report estimates as plain minutes ("316"), with a unit
//! ("316m") or split into hours and minutes ("5h 30m"). Everything is
//! normalized to minutes here.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)h").expect("hours pattern is valid"));
static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)m").expect("minutes pattern is valid"));
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)").expect("digits pattern is valid"));

/// Parse a remaining-time sensor value into minutes
///
/// Numeric input is returned unchanged (callers decide whether zero or a
/// negative estimate is meaningful). Otherwise the first `<n>h` and `<n>m`
/// components are summed, falling back to the first digit run. `None` when
/// nothing usable is found or the total is zero.
pub fn parse_time_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(number) = raw.parse::<f64>() {
        return number.is_finite().then_some(number);
    }

    let lower = raw.to_lowercase();
    let mut total: u64 = 0;

    if let Some(hours) = first_number(&HOURS, &lower) {
        total = total.saturating_add(hours.saturating_mul(60));
    }
    if let Some(minutes) = first_number(&MINUTES, &lower) {
        total = total.saturating_add(minutes);
    }
    if total == 0
        && let Some(number) = first_number(&DIGITS, &lower)
    {
        total = number;
    }

    if total == 0 {
        trace!("No usable minutes in time value '{}'", raw);
        return None;
    }
    Some(total as f64)
}

/// Parsed minutes that count as a running estimate (finite and above zero)
pub fn valid_minutes(raw: &str) -> Option<f64> {
    parse_time_value(raw).filter(|minutes| *minutes > 0.0)
}

fn first_number(pattern: &Regex, text: &str) -> Option<u64> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<u64>().ok())
}
