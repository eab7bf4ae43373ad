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

//! One full evaluation of the card: every battery, both outage windows and
//! the readiness analysis of the selected battery.

use crate::analyzer::OutageAnalyzer;
use crate::battery::{
    ac_out_power, activity, charge_percent, charge_time_needed, gradient_hue, remaining_time,
};
use crate::context::EvaluationContext;
use crate::format::{format_date_time, format_minutes, format_percent, format_power};
use crate::outage::{current_outage_status, next_outage};
use crate::traits::SensorSource;
use eco_battery_types::{
    AnalysisResult, BatteryReport, BatterySpec, CardConfig, CardReport, ChargeLevel,
    NextOutageReport, OutageReport,
};
use tracing::trace;

/// Evaluate a normalized config against the current sensor readings
///
/// Pure: the same config, readings and context always give the same report.
pub fn evaluate(
    config: &CardConfig,
    source: &impl SensorSource,
    ctx: &EvaluationContext,
) -> CardReport {
    let batteries: Vec<BatteryReport> = config
        .batteries
        .iter()
        .enumerate()
        .map(|(index, battery)| battery_report(config, index, battery, source))
        .collect();

    let status = current_outage_status(config, source, ctx);
    let next = next_outage(config, source, ctx);

    let analysis = match (config.selected(), batteries.get(config.selected_battery)) {
        (Some(battery), Some(report)) => OutageAnalyzer::new(config.analysis).analyze(
            battery,
            &report.time_state,
            report.percent,
            &status,
            &next,
            charge_time_needed(battery, source),
        ),
        _ => AnalysisResult::default(),
    };

    trace!(
        "Evaluated {} batteries, outage active: {}, level: {}",
        batteries.len(),
        status.active,
        analysis.warning_level
    );

    CardReport {
        evaluated_at: ctx.now,
        selected_battery: config.selected_battery,
        palette: config.palette,
        show_state: config.show_state,
        batteries,
        outage: OutageReport {
            end_time_label: status.end_time.map(|end| format_date_time(end, ctx)),
            remaining_label: status.minutes_remaining.map(format_minutes),
            status,
        },
        next_outage: NextOutageReport {
            start_time_label: next.start_time.map(|start| format_date_time(start, ctx)),
            until_label: next.minutes_until.map(format_minutes),
            next,
        },
        analysis,
    }
}

fn battery_report(
    config: &CardConfig,
    index: usize,
    battery: &BatterySpec,
    source: &impl SensorSource,
) -> BatteryReport {
    let percent = charge_percent(battery, source);
    let time_state = remaining_time(battery, source);
    let ac_out_power_w = ac_out_power(battery, source);

    BatteryReport {
        index,
        entity: battery.entity.clone(),
        name: battery.display_name(index),
        percent,
        percent_label: format_percent(percent, config.precision),
        charge_level: ChargeLevel::classify(percent, config.yellow, config.green),
        gradient_hue: gradient_hue(percent),
        time_label: time_state.minutes().map(format_minutes),
        activity: activity(battery, &time_state),
        time_state,
        ac_out_power_label: ac_out_power_w.filter(|watts| *watts > 0.0).map(format_power),
        ac_out_power_w,
    }
}
