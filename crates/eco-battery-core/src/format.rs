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

//! Text rendering of durations, power, percentages and outage times.

use crate::context::EvaluationContext;
use chrono::{DateTime, Utc};

/// Render minutes as `"2h 30m"`, `"2h"` or `"45m"` (`"0m"` for zero)
pub fn format_minutes(total: u32) -> String {
    let hours = total.div_euclid(60);
    let minutes = total.rem_euclid(60);

    if hours > 0 && minutes > 0 {
        format!("{hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{minutes}m")
    }
}

/// Render watts, switching to kilowatts from 1000 W
pub fn format_power(watts: f64) -> String {
    if watts >= 1000.0 {
        format!("{:.2} kW", watts / 1000.0)
    } else {
        format!("{} W", watts.round())
    }
}

pub fn format_percent(percent: f64, precision: usize) -> String {
    format!("{percent:.precision$}%")
}

/// Render an instant relative to the evaluation day in the local zone
///
/// `Today 14:30`, `Tomorrow 06:00`, otherwise `Oct 21, 09:15`.
pub fn format_date_time(instant: DateTime<Utc>, ctx: &EvaluationContext) -> String {
    let local = instant.with_timezone(&ctx.tz);
    let today = ctx.now.with_timezone(&ctx.tz).date_naive();
    let time = local.format("%H:%M");

    if local.date_naive() == today {
        format!("Today {time}")
    } else if today.succ_opt() == Some(local.date_naive()) {
        format!("Tomorrow {time}")
    } else {
        local.format("%b %-d, %H:%M").to_string()
    }
}
