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

//! Per-battery facts derived from the current sensor readings.

use crate::time_parser::valid_minutes;
use crate::traits::SensorSource;
use eco_battery_types::{BatteryActivity, BatterySpec, TimeState};
use serde_json::Value;
use tracing::trace;

/// Attributes consulted when the percentage sensor state is not numeric
const PERCENT_ATTRIBUTES: [&str; 2] = ["battery", "level"];

/// Derive the remaining-time state of a battery
///
/// The discharge estimate is checked first and wins whenever it is valid
/// (finite and above zero), even if a charge estimate is reported too.
// TODO: confirm with product whether a device may legitimately report both
// estimates at once (near-zero grid draw); a stale discharge value currently
// hides a valid charge time.
pub fn remaining_time(battery: &BatterySpec, source: &impl SensorSource) -> TimeState {
    if let Some(minutes) = sensor_minutes(battery.discharge_time_entity.as_deref(), source) {
        return TimeState::Discharging { minutes };
    }
    if let Some(minutes) = sensor_minutes(battery.charge_time_entity.as_deref(), source) {
        return TimeState::Charging { minutes };
    }
    TimeState::Idle
}

/// Minutes the selected battery still needs to reach full charge
///
/// Kept fractional: the charge-readiness check compares the raw estimate.
pub fn charge_time_needed(battery: &BatterySpec, source: &impl SensorSource) -> Option<f64> {
    exact_sensor_minutes(battery.charge_time_entity.as_deref(), source)
}

fn sensor_minutes(entity_id: Option<&str>, source: &impl SensorSource) -> Option<u32> {
    exact_sensor_minutes(entity_id, source).map(|minutes| minutes.round() as u32)
}

fn exact_sensor_minutes(entity_id: Option<&str>, source: &impl SensorSource) -> Option<f64> {
    let value = source.value_of(entity_id)?;
    let minutes = valid_minutes(value);
    if minutes.is_none() {
        trace!(
            "Ignoring time sensor {:?} with unusable value '{}'",
            entity_id, value
        );
    }
    minutes
}

/// Charge percentage in `[0, 100]`
///
/// Uses the numeric state, else the `battery`/`level` attribute, else 0.
/// Inverted sensors report depletion and are flipped.
pub fn charge_percent(battery: &BatterySpec, source: &impl SensorSource) -> f64 {
    let Some(reading) = source.reading(&battery.entity) else {
        return 0.0;
    };

    let mut percent = reading
        .state
        .as_deref()
        .and_then(|state| state.trim().parse::<f64>().ok())
        .filter(|value| !value.is_nan())
        .or_else(|| {
            PERCENT_ATTRIBUTES
                .iter()
                .find_map(|key| reading.attribute(key).filter(|value| !value.is_null()))
                .and_then(attribute_number)
        })
        .unwrap_or(0.0);

    if battery.invert {
        percent = 100.0 - percent;
    }
    if !percent.is_finite() {
        percent = 0.0;
    }
    percent.clamp(0.0, 100.0)
}

fn attribute_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// AC output power in watts; negative or non-numeric readings are absent
pub fn ac_out_power(battery: &BatterySpec, source: &impl SensorSource) -> Option<f64> {
    let value = source.value_of(battery.ac_out_power_entity.as_deref())?;
    value
        .parse::<f64>()
        .ok()
        .filter(|watts| watts.is_finite() && *watts >= 0.0)
}

/// Status indicator for a battery given its remaining-time state
pub fn activity(battery: &BatterySpec, time_state: &TimeState) -> BatteryActivity {
    match time_state {
        TimeState::Charging { .. } => BatteryActivity::Charging,
        TimeState::Discharging { .. } => BatteryActivity::Discharging,
        TimeState::Idle if battery.has_time_sensors() => BatteryActivity::Connected,
        TimeState::Idle => BatteryActivity::Unknown,
    }
}

/// Hue for the gradient palette: 0 (red) at empty to 120 (green) at full
pub fn gradient_hue(percent: f64) -> u16 {
    (percent.clamp(0.0, 100.0) / 100.0 * 120.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_battery_types::{SensorReading, SensorSnapshot};

    const LEVEL: &str = "sensor.delta_2_main_battery_level";
    const DISCHARGE: &str = "sensor.delta_2_discharge_remaining_time";
    const CHARGE: &str = "sensor.delta_2_charge_remaining_time";
    const POWER: &str = "sensor.delta_2_ac_out_power";

    fn delta() -> BatterySpec {
        BatterySpec::new(LEVEL)
            .with_name("Delta 2")
            .with_discharge_time(DISCHARGE)
            .with_charge_time(CHARGE)
            .with_ac_out_power(POWER)
    }

    #[test]
    fn test_discharge_wins_over_charge() {
        let snapshot = SensorSnapshot::new()
            .with_state(DISCHARGE, "316m")
            .with_state(CHARGE, "45");
        assert_eq!(
            remaining_time(&delta(), &snapshot),
            TimeState::Discharging { minutes: 316 }
        );
    }

    #[test]
    fn test_zero_discharge_falls_back_to_charge() {
        let snapshot = SensorSnapshot::new()
            .with_state(DISCHARGE, "0")
            .with_state(CHARGE, "1h 15m");
        assert_eq!(
            remaining_time(&delta(), &snapshot),
            TimeState::Charging { minutes: 75 }
        );
    }

    #[test]
    fn test_unavailable_sensors_are_idle() {
        let snapshot = SensorSnapshot::new()
            .with_state(DISCHARGE, "unavailable")
            .with_state(CHARGE, "unknown");
        assert_eq!(remaining_time(&delta(), &snapshot), TimeState::Idle);
        assert_eq!(
            remaining_time(&delta(), &SensorSnapshot::new()),
            TimeState::Idle
        );
    }

    #[test]
    fn test_fractional_minutes_are_rounded() {
        let snapshot = SensorSnapshot::new().with_state(DISCHARGE, "90.6");
        assert_eq!(
            remaining_time(&delta(), &snapshot),
            TimeState::Discharging { minutes: 91 }
        );
    }

    #[test]
    fn test_charge_time_needed() {
        let snapshot = SensorSnapshot::new().with_state(CHARGE, "2h");
        assert_eq!(charge_time_needed(&delta(), &snapshot), Some(120.0));

        let fractional = SensorSnapshot::new().with_state(CHARGE, "90.4");
        assert_eq!(charge_time_needed(&delta(), &fractional), Some(90.4));
        assert_eq!(
            remaining_time(&delta(), &fractional),
            TimeState::Charging { minutes: 90 }
        );
        assert_eq!(
            charge_time_needed(&BatterySpec::new(LEVEL), &snapshot),
            None
        );
    }

    #[test]
    fn test_charge_percent_sources() {
        let battery = BatterySpec::new(LEVEL);

        let numeric = SensorSnapshot::new().with_state(LEVEL, "87.5");
        assert_eq!(charge_percent(&battery, &numeric), 87.5);

        let mut from_attribute = SensorSnapshot::new();
        from_attribute.insert(
            LEVEL,
            SensorReading::new("charging").with_attribute("level", "64"),
        );
        assert_eq!(charge_percent(&battery, &from_attribute), 64.0);

        let mut battery_attribute = SensorSnapshot::new();
        battery_attribute.insert(
            LEVEL,
            SensorReading::new("unknown")
                .with_attribute("battery", 41)
                .with_attribute("level", 99),
        );
        assert_eq!(charge_percent(&battery, &battery_attribute), 41.0);

        assert_eq!(charge_percent(&battery, &SensorSnapshot::new()), 0.0);
    }

    #[test]
    fn test_charge_percent_invert_and_clamp() {
        let mut inverted = BatterySpec::new(LEVEL);
        inverted.invert = true;
        let snapshot = SensorSnapshot::new().with_state(LEVEL, "30");
        assert_eq!(charge_percent(&inverted, &snapshot), 70.0);

        let battery = BatterySpec::new(LEVEL);
        let over = SensorSnapshot::new().with_state(LEVEL, "104");
        assert_eq!(charge_percent(&battery, &over), 100.0);
        let under = SensorSnapshot::new().with_state(LEVEL, "-3");
        assert_eq!(charge_percent(&battery, &under), 0.0);
    }

    #[test]
    fn test_ac_out_power_rejects_negative() {
        let battery = delta();
        let snapshot = SensorSnapshot::new().with_state(POWER, "245.5");
        assert_eq!(ac_out_power(&battery, &snapshot), Some(245.5));

        let negative = SensorSnapshot::new().with_state(POWER, "-12");
        assert_eq!(ac_out_power(&battery, &negative), None);

        let garbage = SensorSnapshot::new().with_state(POWER, "n/a");
        assert_eq!(ac_out_power(&battery, &garbage), None);
    }

    #[test]
    fn test_activity() {
        let battery = delta();
        assert_eq!(
            activity(&battery, &TimeState::Charging { minutes: 5 }),
            BatteryActivity::Charging
        );
        assert_eq!(
            activity(&battery, &TimeState::Idle),
            BatteryActivity::Connected
        );
        assert_eq!(
            activity(&BatterySpec::new(LEVEL), &TimeState::Idle),
            BatteryActivity::Unknown
        );
    }

    #[test]
    fn test_gradient_hue() {
        assert_eq!(gradient_hue(0.0), 0);
        assert_eq!(gradient_hue(50.0), 60);
        assert_eq!(gradient_hue(100.0), 120);
    }
}
