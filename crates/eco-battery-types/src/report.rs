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

use crate::analysis::AnalysisResult;
use crate::battery::{BatteryActivity, ChargeLevel, Palette, TimeState};
use crate::outage::{NextOutage, OutageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the presentation layer needs for one battery column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryReport {
    pub index: usize,
    pub entity: String,
    pub name: String,
    pub percent: f64,
    pub percent_label: String,
    pub charge_level: ChargeLevel,
    /// Hue for the gradient palette (0 = red, 120 = green)
    pub gradient_hue: u16,
    pub time_state: TimeState,
    pub time_label: Option<String>,
    pub activity: BatteryActivity,
    pub ac_out_power_w: Option<f64>,
    pub ac_out_power_label: Option<String>,
}

/// Current outage plus its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutageReport {
    #[serde(flatten)]
    pub status: OutageStatus,
    pub end_time_label: Option<String>,
    pub remaining_label: Option<String>,
}

/// Next outage plus its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextOutageReport {
    #[serde(flatten)]
    pub next: NextOutage,
    pub start_time_label: Option<String>,
    pub until_label: Option<String>,
}

/// Result of one full card evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardReport {
    pub evaluated_at: DateTime<Utc>,
    pub selected_battery: usize,
    /// Fill palette the batteries are drawn with
    pub palette: Palette,
    /// Whether the status line under each battery is shown
    pub show_state: bool,
    pub batteries: Vec<BatteryReport>,
    pub outage: OutageReport,
    pub next_outage: NextOutageReport,
    pub analysis: AnalysisResult,
}
