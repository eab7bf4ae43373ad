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

//! Current and upcoming outage windows.

use crate::context::EvaluationContext;
use crate::datetime::parse_date_time;
use crate::traits::SensorSource;
use eco_battery_types::{CardConfig, NextOutage, OutageStatus};
use tracing::debug;

/// Status values that mean the grid is currently down
pub const ACTIVE_OUTAGE_STATES: [&str; 5] = ["on", "true", "active", "1", "outage"];

/// Whether an outage status sensor value reports an active outage
pub fn is_outage_active(state: &str) -> bool {
    let state = state.trim().to_lowercase();
    ACTIVE_OUTAGE_STATES.contains(&state.as_str())
}

/// Current outage status from the status and end-time sensors
///
/// Without a status sensor there is never an outage. The end time and the
/// remaining minutes are only resolved while the outage is active.
pub fn current_outage_status(
    config: &CardConfig,
    source: &impl SensorSource,
    ctx: &EvaluationContext,
) -> OutageStatus {
    let Some(status_entity) = config.outage_status_entity.as_deref() else {
        return OutageStatus::inactive();
    };
    let active = source
        .reading(status_entity)
        .and_then(|reading| reading.state.as_deref())
        .is_some_and(is_outage_active);

    if !active {
        return OutageStatus::inactive();
    }

    let end_time = source
        .value_of(config.outage_end_time_entity.as_deref())
        .and_then(|value| {
            let parsed = parse_date_time(value, ctx.tz);
            if parsed.is_none() {
                debug!("Outage end time '{}' could not be parsed", value);
            }
            parsed
        });

    match end_time {
        Some(end_time) => OutageStatus::active_until(end_time, ctx.minutes_until(end_time)),
        None => OutageStatus::active(),
    }
}

/// Next scheduled outage from the schedule sensor
pub fn next_outage(
    config: &CardConfig,
    source: &impl SensorSource,
    ctx: &EvaluationContext,
) -> NextOutage {
    let Some(value) = source.value_of(config.next_outage_time_entity.as_deref()) else {
        return NextOutage::unknown();
    };
    match parse_date_time(value, ctx.tz) {
        Some(start_time) => NextOutage::at(start_time, ctx.minutes_until(start_time)),
        None => {
            debug!("Next outage time '{}' could not be parsed", value);
            NextOutage::unknown()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use chrono_tz::Tz;
    use eco_battery_types::{BatterySpec, SensorSnapshot};

    const STATUS: &str = "sensor.outage_status";
    const END: &str = "sensor.outage_end_time";
    const NEXT: &str = "sensor.next_outage_time";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).unwrap()
    }

    fn ctx() -> EvaluationContext {
        EvaluationContext::new(now(), Tz::UTC)
    }

    fn config() -> CardConfig {
        CardConfig {
            outage_status_entity: Some(STATUS.to_owned()),
            outage_end_time_entity: Some(END.to_owned()),
            next_outage_time_entity: Some(NEXT.to_owned()),
            ..CardConfig::with_batteries(vec![BatterySpec::new("sensor.battery_level")])
        }
    }

    #[test]
    fn test_active_state_values() {
        for state in ["on", "TRUE", "Active", "1", "outage", " on "] {
            assert!(is_outage_active(state), "{state} should be active");
        }
        for state in ["off", "false", "0", "connected", "unknown", "inactive", ""] {
            assert!(!is_outage_active(state), "{state} should be inactive");
        }
    }

    #[test]
    fn test_no_status_sensor_means_no_outage() {
        let config = CardConfig::with_batteries(vec![BatterySpec::new("sensor.battery_level")]);
        let snapshot = SensorSnapshot::new().with_state(STATUS, "on");
        assert_eq!(
            current_outage_status(&config, &snapshot, &ctx()),
            OutageStatus::inactive()
        );
    }

    #[test]
    fn test_active_outage_with_end_time() {
        let snapshot = SensorSnapshot::new()
            .with_state(STATUS, "on")
            .with_state(END, "2025-10-19T13:00:00Z");
        let status = current_outage_status(&config(), &snapshot, &ctx());

        assert!(status.active);
        assert_eq!(status.end_time, Some(now() + Duration::hours(1)));
        assert_eq!(status.minutes_remaining, Some(60));
    }

    #[test]
    fn test_active_outage_end_in_past_clamps_to_zero() {
        let snapshot = SensorSnapshot::new()
            .with_state(STATUS, "outage")
            .with_state(END, "2025-10-19T11:00:00Z");
        let status = current_outage_status(&config(), &snapshot, &ctx());
        assert_eq!(status.minutes_remaining, Some(0));
    }

    #[test]
    fn test_active_outage_with_unusable_end_time() {
        let snapshot = SensorSnapshot::new()
            .with_state(STATUS, "on")
            .with_state(END, "unavailable");
        assert_eq!(
            current_outage_status(&config(), &snapshot, &ctx()),
            OutageStatus::active()
        );
    }

    #[test]
    fn test_inactive_outage_ignores_end_time() {
        let snapshot = SensorSnapshot::new()
            .with_state(STATUS, "off")
            .with_state(END, "2025-10-19T13:00:00Z");
        assert_eq!(
            current_outage_status(&config(), &snapshot, &ctx()),
            OutageStatus::inactive()
        );
    }

    #[test]
    fn test_next_outage_from_timestamp() {
        let start = now() + Duration::minutes(90);
        let snapshot = SensorSnapshot::new().with_state(NEXT, start.timestamp().to_string());
        assert_eq!(
            next_outage(&config(), &snapshot, &ctx()),
            NextOutage::at(start, 90)
        );
    }

    #[test]
    fn test_next_outage_unusable_values() {
        for state in ["unknown", "unavailable", "", "tomorrow-ish"] {
            let snapshot = SensorSnapshot::new().with_state(NEXT, state);
            assert_eq!(
                next_outage(&config(), &snapshot, &ctx()),
                NextOutage::unknown()
            );
        }
        assert_eq!(
            next_outage(&config(), &SensorSnapshot::new(), &ctx()),
            NextOutage::unknown()
        );
    }
}
