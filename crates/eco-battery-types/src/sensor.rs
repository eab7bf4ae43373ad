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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Sensor states that mean "no data" rather than a value
pub const UNKNOWN_STATE: &str = "unknown";
pub const UNAVAILABLE_STATE: &str = "unavailable";

/// A single sensor reading as delivered by the state provider
///
/// The state is kept verbatim; interpretation (time, date, percentage, power)
/// happens in the core parsers on every evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub state: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl SensorReading {
    /// Reading with a state and no attributes
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            attributes: Map::new(),
        }
    }

    /// Attach an attribute (builder style, mostly for tests and adapters)
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Usable state value, or `None` for absent, blank, `unknown` and `unavailable`
    pub fn value(&self) -> Option<&str> {
        let state = self.state.as_deref()?.trim();
        if state.is_empty()
            || state.eq_ignore_ascii_case(UNKNOWN_STATE)
            || state.eq_ignore_ascii_case(UNAVAILABLE_STATE)
        {
            return None;
        }
        Some(state)
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Point-in-time capture of every sensor the card references
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    readings: HashMap<String, SensorReading>,
}

impl SensorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, reading: SensorReading) {
        self.readings.insert(entity_id.into(), reading);
    }

    /// Builder variant of [`SensorSnapshot::insert`] for a plain state string
    #[must_use]
    pub fn with_state(mut self, entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        self.insert(entity_id, SensorReading::new(state));
        self
    }

    pub fn get(&self, entity_id: &str) -> Option<&SensorReading> {
        self.readings.get(entity_id)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl FromIterator<(String, SensorReading)> for SensorSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, SensorReading)>>(iter: I) -> Self {
        Self {
            readings: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_filters_placeholder_states() {
        assert_eq!(SensorReading::new("42").value(), Some("42"));
        assert_eq!(SensorReading::new("  5h 30m ").value(), Some("5h 30m"));
        assert_eq!(SensorReading::new("unknown").value(), None);
        assert_eq!(SensorReading::new("Unavailable").value(), None);
        assert_eq!(SensorReading::new("").value(), None);
        assert_eq!(SensorReading::default().value(), None);
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = SensorSnapshot::new()
            .with_state("sensor.delta_2_main_battery_level", "87")
            .with_state("sensor.delta_2_ac_out_power", "120");

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot
                .get("sensor.delta_2_main_battery_level")
                .and_then(SensorReading::value),
            Some("87")
        );
        assert!(snapshot.get("sensor.missing").is_none());
    }

    #[test]
    fn test_reading_deserializes_without_attributes() {
        let reading: SensorReading = serde_json::from_value(json!({ "state": "on" })).unwrap();
        assert_eq!(reading.value(), Some("on"));
        assert!(reading.attributes.is_empty());

        let with_attrs = SensorReading::new("n/a").with_attribute("battery", 64);
        assert_eq!(with_attrs.attribute("battery"), Some(&json!(64)));
    }
}
