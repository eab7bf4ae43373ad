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

use crate::battery::{BatterySpec, Palette};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

// ============= Analysis Policy =============

/// Spare discharge time below which a sufficient battery is still flagged
pub const MIN_COMFORTABLE_SPARE_MINUTES: u32 = 30;

/// Batteries at or above this charge skip the charge-before-next-outage check
pub const CHARGE_READY_PERCENT: f64 = 80.0;

/// Charging margin below which the user is nudged to start charging
pub const CHARGE_MARGIN_NOTICE_MINUTES: u32 = 60;

/// Thresholds driving the outage readiness analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisThresholds {
    pub min_comfortable_spare_minutes: u32,
    pub charge_ready_percent: f64,
    pub charge_margin_notice_minutes: u32,
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            min_comfortable_spare_minutes: MIN_COMFORTABLE_SPARE_MINUTES,
            charge_ready_percent: CHARGE_READY_PERCENT,
            charge_margin_notice_minutes: CHARGE_MARGIN_NOTICE_MINUTES,
        }
    }
}

// ============= Card Configuration =============

/// Configuration errors detected at setup; the only hard failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardConfigError {
    #[error("You must specify at least one battery in the \"batteries\" array.")]
    NoBatteries,

    #[error("Battery at index {index} is missing required \"entity\" field.")]
    MissingEntity { index: usize },
}

/// Battery card configuration
///
/// Deserialized from the card/addon options and normalized once with
/// [`CardConfig::normalize`]. The core only consumes normalized configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    /// Batteries shown side by side
    #[serde(default)]
    pub batteries: Vec<BatterySpec>,

    /// Index of the battery that feeds the outage analysis
    #[serde(default)]
    pub selected_battery: usize,

    /// Outage sensors (shared across all batteries)
    #[serde(default)]
    pub outage_status_entity: Option<String>,
    #[serde(default)]
    pub outage_end_time_entity: Option<String>,
    #[serde(default)]
    pub next_outage_time_entity: Option<String>,

    /// Percentage at or above which the fill is green
    #[serde(default = "default_green")]
    pub green: f64,

    /// Percentage below which the fill is red
    #[serde(default = "default_yellow")]
    pub yellow: f64,

    #[serde(default)]
    pub palette: Palette,

    /// Decimal places of the percentage label
    #[serde(default)]
    pub precision: usize,

    #[serde(default = "default_show_state")]
    pub show_state: bool,

    #[serde(default)]
    pub analysis: AnalysisThresholds,
}

fn default_green() -> f64 {
    60.0
}

fn default_yellow() -> f64 {
    25.0
}

fn default_show_state() -> bool {
    true
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            batteries: Vec::new(),
            selected_battery: 0,
            outage_status_entity: None,
            outage_end_time_entity: None,
            next_outage_time_entity: None,
            green: default_green(),
            yellow: default_yellow(),
            palette: Palette::default(),
            precision: 0,
            show_state: default_show_state(),
            analysis: AnalysisThresholds::default(),
        }
    }
}

impl CardConfig {
    /// Config with the given batteries and everything else defaulted
    pub fn with_batteries(batteries: Vec<BatterySpec>) -> Self {
        Self {
            batteries,
            ..Self::default()
        }
    }

    /// Validate required references and normalize optional ones
    ///
    /// Blank optional entity ids become `None` and `selected_battery` is
    /// clamped into the battery range.
    pub fn normalize(mut self) -> Result<Self, CardConfigError> {
        if self.batteries.is_empty() {
            return Err(CardConfigError::NoBatteries);
        }

        for (index, battery) in self.batteries.iter_mut().enumerate() {
            battery.entity = battery.entity.trim().to_owned();
            if battery.entity.is_empty() {
                return Err(CardConfigError::MissingEntity { index });
            }
            battery.name = battery.name.trim().to_owned();
            blank_to_none(&mut battery.discharge_time_entity);
            blank_to_none(&mut battery.charge_time_entity);
            blank_to_none(&mut battery.ac_out_power_entity);
        }

        blank_to_none(&mut self.outage_status_entity);
        blank_to_none(&mut self.outage_end_time_entity);
        blank_to_none(&mut self.next_outage_time_entity);

        self.selected_battery = self.selected_battery.min(self.batteries.len() - 1);
        Ok(self)
    }

    /// Battery feeding the outage analysis
    pub fn selected(&self) -> Option<&BatterySpec> {
        self.batteries.get(self.selected_battery)
    }

    /// Every entity id the card reads, deduplicated and sorted
    pub fn entity_ids(&self) -> BTreeSet<String> {
        self.batteries
            .iter()
            .flat_map(BatterySpec::entity_ids)
            .chain(
                [
                    &self.outage_status_entity,
                    &self.outage_end_time_entity,
                    &self.next_outage_time_entity,
                ]
                .into_iter()
                .filter_map(|entity| entity.as_deref()),
            )
            .map(ToOwned::to_owned)
            .collect()
    }
}

fn blank_to_none(entity: &mut Option<String>) {
    *entity = entity
        .take()
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_batteries() -> CardConfig {
        serde_json::from_value(json!({
            "batteries": [
                {
                    "entity": "sensor.delta_2_main_battery_level",
                    "name": "Delta 2",
                    "remaining_time_entity": "sensor.delta_2_discharge_remaining_time",
                    "charge_remaining_time_entity": "sensor.delta_2_charge_remaining_time",
                    "ac_out_power_entity": "sensor.delta_2_ac_out_power"
                },
                {
                    "entity": "sensor.river_2_battery_level",
                    "name": "River 2",
                    "remaining_time_entity": ""
                }
            ],
            "selected_battery": 7,
            "outage_status_entity": "sensor.outage_status",
            "outage_end_time_entity": "sensor.outage_end_time",
            "next_outage_time_entity": "sensor.next_outage_time"
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = two_batteries();
        assert_eq!(config.green, 60.0);
        assert_eq!(config.yellow, 25.0);
        assert_eq!(config.palette, Palette::Threshold);
        assert_eq!(config.precision, 0);
        assert!(config.show_state);
        assert_eq!(config.analysis, AnalysisThresholds::default());
    }

    #[test]
    fn test_normalize_clamps_selection_and_blanks() {
        let config = two_batteries().normalize().unwrap();
        assert_eq!(config.selected_battery, 1);
        assert_eq!(config.selected().unwrap().name, "River 2");
        assert!(config.batteries[1].discharge_time_entity.is_none());
    }

    #[test]
    fn test_normalize_rejects_empty_battery_list() {
        let config = CardConfig::default();
        assert_eq!(config.normalize(), Err(CardConfigError::NoBatteries));
    }

    #[test]
    fn test_normalize_rejects_missing_entity() {
        let config = CardConfig::with_batteries(vec![
            BatterySpec::new("sensor.ok_battery_level"),
            BatterySpec::new("  "),
        ]);
        let err = config.normalize().unwrap_err();
        assert_eq!(err, CardConfigError::MissingEntity { index: 1 });
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_entity_ids_are_deduplicated() {
        let config = two_batteries().normalize().unwrap();
        let ids = config.entity_ids();
        assert_eq!(ids.len(), 8);
        assert!(ids.contains("sensor.next_outage_time"));
        assert!(ids.contains("sensor.river_2_battery_level"));
    }

    #[test]
    fn test_analysis_thresholds_partial_override() {
        let thresholds: AnalysisThresholds =
            serde_json::from_value(json!({ "charge_ready_percent": 90.0 })).unwrap();
        assert_eq!(thresholds.charge_ready_percent, 90.0);
        assert_eq!(
            thresholds.min_comfortable_spare_minutes,
            MIN_COMFORTABLE_SPARE_MINUTES
        );
    }
}
