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

//! Outage readiness analysis.
//!
//! Two checks run in order:
//! 1. During an active outage with a known end: will the discharging battery
//!    last until the grid returns?
//! 2. Between outages: can the battery still be charged before the next one?
//!
//! The second check may raise the warning level or fill an empty message but
//! never lowers what the first one decided.

use crate::format::format_minutes;
use eco_battery_types::{
    AnalysisResult, AnalysisThresholds, BatterySpec, NextOutage, OutageStatus, TimeState,
    WarningLevel,
};
use tracing::debug;

pub use eco_battery_types::{
    CHARGE_MARGIN_NOTICE_MINUTES, CHARGE_READY_PERCENT, MIN_COMFORTABLE_SPARE_MINUTES,
};

/// Outage readiness analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct OutageAnalyzer {
    thresholds: AnalysisThresholds,
}

impl OutageAnalyzer {
    pub fn new(thresholds: AnalysisThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify the outage situation for one battery
    ///
    /// `charge_time_needed` is the battery's own estimate of minutes until
    /// full, unrounded; without it the charge-readiness check cannot run.
    pub fn analyze(
        &self,
        battery: &BatterySpec,
        time_state: &TimeState,
        current_percent: f64,
        outage: &OutageStatus,
        next: &NextOutage,
        charge_time_needed: Option<f64>,
    ) -> AnalysisResult {
        let mut result = AnalysisResult::default();

        if outage.active
            && let Some(minutes_remaining) = outage.minutes_remaining
            && let Some(discharge_minutes) = time_state.discharge_minutes()
        {
            self.check_outage_sufficiency(battery, discharge_minutes, minutes_remaining, &mut result);
        }

        if !outage.active
            && let Some(minutes_until) = next.minutes_until
            && let Some(charge_minutes) = charge_time_needed
            && current_percent < self.thresholds.charge_ready_percent
        {
            self.check_charge_readiness(battery, charge_minutes, minutes_until, &mut result);
        }

        if result.warning_level > WarningLevel::Ok {
            debug!(
                "🔋 Outage analysis for {}: {} - {}",
                battery.message_name("battery"),
                result.warning_level,
                result.message
            );
        }
        result
    }

    fn check_outage_sufficiency(
        &self,
        battery: &BatterySpec,
        discharge_minutes: u32,
        minutes_remaining: u32,
        result: &mut AnalysisResult,
    ) {
        let name = battery.message_name("Battery");
        let sufficient = discharge_minutes >= minutes_remaining;
        result.sufficient_for_outage = Some(sufficient);

        if !sufficient {
            let shortfall = minutes_remaining - discharge_minutes;
            result.warning_level = WarningLevel::Critical;
            result.message = format!(
                "⚠️ {name} may run out {} before outage ends!",
                format_minutes(shortfall)
            );
            return;
        }

        let excess = discharge_minutes - minutes_remaining;
        if excess < self.thresholds.min_comfortable_spare_minutes {
            result.warning_level = WarningLevel::Warning;
            result.message = format!(
                "⚡ {name} sufficient, but only {} spare time",
                format_minutes(excess)
            );
        } else {
            result.warning_level = WarningLevel::Ok;
            result.message = format!(
                "✅ {name} sufficient for outage ({} spare)",
                format_minutes(excess)
            );
        }
    }

    fn check_charge_readiness(
        &self,
        battery: &BatterySpec,
        charge_minutes: f64,
        minutes_until: u32,
        result: &mut AnalysisResult,
    ) {
        let name = battery.message_name("battery");
        let minutes_until = f64::from(minutes_until);
        let can_charge = minutes_until >= charge_minutes;
        result.can_charge_before_next = Some(can_charge);

        if !can_charge {
            result.warning_level = result.warning_level.escalate(WarningLevel::Warning);
            if result.message.is_empty() {
                result.message =
                    format!("⚠️ Not enough time to fully charge {name} before next outage!");
            }
            return;
        }

        let margin = minutes_until - charge_minutes;
        if margin < f64::from(self.thresholds.charge_margin_notice_minutes)
            && result.warning_level == WarningLevel::Ok
        {
            result.warning_level = WarningLevel::Info;
            if result.message.is_empty() {
                result.message = format!(
                    "⏰ Start charging {name} soon - {} margin",
                    format_minutes(margin.round() as u32)
                );
            }
        }
    }
}
