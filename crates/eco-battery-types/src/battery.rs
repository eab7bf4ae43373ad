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
use std::fmt;

// ============= Battery Configuration =============

/// One configured battery and the sensors describing it
///
/// Only `entity` (the charge percentage sensor) is required. The time and
/// power sensors are optional and resolved by entity id on every evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterySpec {
    /// Battery percentage sensor
    #[serde(default)]
    pub entity: String,

    /// Display name (empty = generated)
    #[serde(default)]
    pub name: String,

    /// Estimated time until empty
    /// Accepts both "discharge_time_entity" and "remaining_time_entity" (card YAML)
    #[serde(default, alias = "remaining_time_entity")]
    pub discharge_time_entity: Option<String>,

    /// Estimated time until full
    /// Accepts both "charge_time_entity" and "charge_remaining_time_entity" (card YAML)
    #[serde(default, alias = "charge_remaining_time_entity")]
    pub charge_time_entity: Option<String>,

    /// AC output power in watts
    #[serde(default)]
    pub ac_out_power_entity: Option<String>,

    /// Sensor reports depletion instead of charge (value is `100 - n`)
    #[serde(default)]
    pub invert: bool,
}

impl BatterySpec {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_discharge_time(mut self, entity: impl Into<String>) -> Self {
        self.discharge_time_entity = Some(entity.into());
        self
    }

    #[must_use]
    pub fn with_charge_time(mut self, entity: impl Into<String>) -> Self {
        self.charge_time_entity = Some(entity.into());
        self
    }

    #[must_use]
    pub fn with_ac_out_power(mut self, entity: impl Into<String>) -> Self {
        self.ac_out_power_entity = Some(entity.into());
        self
    }

    /// Name shown on the battery column: configured name or "Battery N" (1-based)
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("Battery {}", index + 1)
        } else {
            self.name.clone()
        }
    }

    /// Name used in analysis messages; `fallback` is "Battery" or "battery"
    /// depending on where in the sentence it lands
    pub fn message_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.name.is_empty() {
            fallback
        } else {
            &self.name
        }
    }

    /// Whether any remaining-time sensor is configured
    pub fn has_time_sensors(&self) -> bool {
        self.discharge_time_entity.is_some() || self.charge_time_entity.is_some()
    }

    /// Every entity id this battery references
    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.entity.as_str()).chain(
            [
                &self.discharge_time_entity,
                &self.charge_time_entity,
                &self.ac_out_power_entity,
            ]
            .into_iter()
            .filter_map(|entity| entity.as_deref()),
        )
    }
}

// ============= Remaining Time =============

/// Normalized remaining-time state of one battery
///
/// At most one direction is authoritative. Discharging wins whenever its
/// reading is valid, even if a charge time is also reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimeState {
    /// Minutes until empty
    Discharging { minutes: u32 },
    /// Minutes until full
    Charging { minutes: u32 },
    /// Neither sensor reported a usable value
    #[default]
    #[serde(rename = "none")]
    Idle,
}

impl TimeState {
    pub fn minutes(&self) -> Option<u32> {
        match self {
            Self::Discharging { minutes } | Self::Charging { minutes } => Some(*minutes),
            Self::Idle => None,
        }
    }

    /// Discharge minutes, only when discharging
    pub fn discharge_minutes(&self) -> Option<u32> {
        match self {
            Self::Discharging { minutes } => Some(*minutes),
            Self::Charging { .. } | Self::Idle => None,
        }
    }
}

// ============= Status Indicator =============

/// What the status indicator under a battery shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryActivity {
    Charging,
    Discharging,
    /// Time sensors exist but neither reports a running estimate
    Connected,
    /// No time sensors configured
    Unknown,
}

impl BatteryActivity {
    /// Arrow/bolt glyph used by the card
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Charging => "↑",
            Self::Discharging => "↓",
            Self::Connected => "⚡",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for BatteryActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charging => write!(f, "charging"),
            Self::Discharging => write!(f, "discharging"),
            Self::Connected => write!(f, "connected"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============= Charge Level Colors =============

/// Color palette used for the fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Three discrete bands driven by the yellow/green thresholds
    #[default]
    Threshold,
    /// Continuous red -> green hue
    Gradient,
}

/// Discrete charge band for the threshold palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeLevel {
    Low,
    Medium,
    High,
}

impl ChargeLevel {
    /// Below `yellow` is low, below `green` is medium, otherwise high
    pub fn classify(percent: f64, yellow: f64, green: f64) -> Self {
        if percent < yellow {
            Self::Low
        } else if percent < green {
            Self::Medium
        } else {
            Self::High
        }
    }
}
