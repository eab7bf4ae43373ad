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

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Inputs shared by every computation of one evaluation
///
/// `now` is captured once so that all minute deltas in a report agree, and
/// `tz` is the local zone used for offset-less sensor values and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationContext {
    pub now: DateTime<Utc>,
    pub tz: Tz,
}

impl EvaluationContext {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self { now, tz }
    }

    /// Context for the current wall-clock time
    pub fn current(tz: Tz) -> Self {
        Self::new(Utc::now(), tz)
    }

    /// Whole minutes from `now` until `instant`, rounded, never negative
    pub fn minutes_until(&self, instant: DateTime<Utc>) -> u32 {
        let millis = instant.signed_duration_since(self.now).num_milliseconds();
        (millis as f64 / 60_000.0).round().max(0.0) as u32
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::current(Tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_minutes_until_rounds_and_clamps() {
        let now = Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).unwrap();
        let ctx = EvaluationContext::new(now, Tz::UTC);

        assert_eq!(ctx.minutes_until(now + Duration::minutes(90)), 90);
        assert_eq!(ctx.minutes_until(now + Duration::seconds(89)), 1);
        assert_eq!(ctx.minutes_until(now + Duration::seconds(90)), 2);
        assert_eq!(ctx.minutes_until(now + Duration::seconds(29)), 0);
        assert_eq!(ctx.minutes_until(now - Duration::hours(1)), 0);
    }
}
