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

//! Eco Battery core: sensor value parsing, per-battery facts, outage windows
//! and the outage readiness analysis.
//!
//! Everything here is pure. Readings come in through [`SensorSource`] and a
//! single [`EvaluationContext`] pins the clock and timezone for one pass.

pub mod analyzer;
pub mod battery;
pub mod context;
pub mod datetime;
pub mod evaluation;
pub mod format;
pub mod outage;
pub mod time_parser;
pub mod traits;

pub use analyzer::{
    CHARGE_MARGIN_NOTICE_MINUTES, CHARGE_READY_PERCENT, MIN_COMFORTABLE_SPARE_MINUTES,
    OutageAnalyzer,
};
pub use battery::{
    ac_out_power, activity, charge_percent, charge_time_needed, gradient_hue, remaining_time,
};
pub use context::EvaluationContext;
pub use datetime::parse_date_time;
pub use evaluation::evaluate;
pub use format::{format_date_time, format_minutes, format_percent, format_power};
pub use outage::{ACTIVE_OUTAGE_STATES, current_outage_status, is_outage_active, next_outage};
pub use time_parser::{parse_time_value, valid_minutes};
pub use traits::SensorSource;
