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

pub mod analysis;
pub mod battery;
pub mod config;
pub mod outage;
pub mod report;
pub mod sensor;

// Re-export common types for convenience
pub use analysis::{AnalysisResult, WarningLevel};
pub use battery::{BatteryActivity, BatterySpec, ChargeLevel, Palette, TimeState};
pub use config::{
    AnalysisThresholds, CHARGE_MARGIN_NOTICE_MINUTES, CHARGE_READY_PERCENT, CardConfig,
    CardConfigError, MIN_COMFORTABLE_SPARE_MINUTES,
};
pub use outage::{NextOutage, OutageStatus};
pub use report::{BatteryReport, CardReport, NextOutageReport, OutageReport};
pub use sensor::{SensorReading, SensorSnapshot, UNAVAILABLE_STATE, UNKNOWN_STATE};
