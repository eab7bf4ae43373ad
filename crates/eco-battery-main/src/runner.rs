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

//! Polling loop: capture sensors, evaluate the card, publish the report.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use eco_battery_core::{EvaluationContext, evaluate};
use eco_battery_ha::{HaResult, HaSnapshotAdapter};
use eco_battery_types::{AnalysisResult, CardConfig, CardReport, WarningLevel};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct StoreState {
    report: Option<CardReport>,
    last_success: Option<DateTime<Utc>>,
    consecutive_failures: u32,
}

/// Latest card report, shared between the poll loop and the API
#[derive(Debug, Default)]
pub struct ReportStore {
    state: RwLock<StoreState>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<CardReport> {
        self.state.read().report.clone()
    }

    /// Store a fresh report, returning the analysis it replaces
    pub fn publish(&self, report: CardReport) -> Option<AnalysisResult> {
        let mut state = self.state.write();
        state.last_success = Some(report.evaluated_at);
        state.consecutive_failures = 0;
        state.report.replace(report).map(|previous| previous.analysis)
    }

    /// Count a failed refresh; the previous report stays available
    pub fn record_failure(&self) -> u32 {
        let mut state = self.state.write();
        state.consecutive_failures += 1;
        state.consecutive_failures
    }

    /// Whether the last successful evaluation is at most `max_age` old
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.state.read().last_success.is_some_and(|evaluated_at| {
            now.signed_duration_since(evaluated_at)
                .to_std()
                .ok()
                .is_none_or(|age| age <= max_age)
        })
    }
}

/// Periodic card evaluation against Home Assistant
#[derive(Debug)]
pub struct Runner {
    adapter: HaSnapshotAdapter,
    card: CardConfig,
    tz: Tz,
    store: Arc<ReportStore>,
}

impl Runner {
    pub fn new(adapter: HaSnapshotAdapter, card: CardConfig, tz: Tz, store: Arc<ReportStore>) -> Self {
        Self {
            adapter,
            card,
            tz,
            store,
        }
    }

    /// One refresh: fetch, evaluate, publish
    pub async fn tick(&self) -> HaResult<CardReport> {
        let snapshot = self.adapter.fetch_snapshot(&self.card).await?;
        let report = evaluate(&self.card, &snapshot, &EvaluationContext::current(self.tz));

        for battery in &report.batteries {
            debug!(
                "{} {}: {} {}",
                battery.activity.icon(),
                battery.name,
                battery.percent_label,
                battery.time_label.as_deref().unwrap_or("-")
            );
        }

        let previous = self.store.publish(report.clone());
        log_analysis_change(previous.as_ref(), &report.analysis);
        Ok(report)
    }

    /// Refresh every `interval` until the task is dropped
    ///
    /// A failed refresh keeps the previous report and is retried next tick.
    pub async fn run(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                let failures = self.store.record_failure();
                if e.is_transient() {
                    warn!(
                        "⚠️ Failed to refresh sensors ({} in a row), keeping previous report: {}",
                        failures, e
                    );
                } else {
                    error!("❌ Failed to refresh sensors ({} in a row): {}", failures, e);
                }
            }
        }
    }
}

fn analysis_changed(previous: Option<&AnalysisResult>, current: &AnalysisResult) -> bool {
    previous.is_none_or(|previous| {
        previous.warning_level != current.warning_level || previous.message != current.message
    })
}

fn log_analysis_change(previous: Option<&AnalysisResult>, current: &AnalysisResult) {
    if !analysis_changed(previous, current) {
        return;
    }
    if !current.has_message() {
        info!("🔋 Outage analysis: {}", current.warning_level);
        return;
    }
    match current.warning_level {
        WarningLevel::Critical | WarningLevel::Warning => {
            warn!("🔋 Outage analysis [{}]: {}", current.warning_level, current.message);
        }
        WarningLevel::Info | WarningLevel::Ok => {
            info!("🔋 Outage analysis [{}]: {}", current.warning_level, current.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_battery_ha::HomeAssistantClient;
    use eco_battery_types::BatterySpec;
    use mockito::Server;
    use serde_json::json;

    fn card() -> CardConfig {
        CardConfig::with_batteries(vec![
            BatterySpec::new("sensor.delta_2_main_battery_level")
                .with_name("Delta 2")
                .with_charge_time("sensor.delta_2_charge_remaining_time"),
        ])
        .normalize()
        .unwrap()
    }

    fn runner(url: String, store: Arc<ReportStore>) -> Runner {
        let client = HomeAssistantClient::new(url, "test_token")
            .unwrap()
            .with_retry_config(1, Duration::from_millis(1));
        Runner::new(HaSnapshotAdapter::new(client), card(), Tz::UTC, store)
    }

    #[tokio::test]
    async fn test_tick_publishes_report() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/states")
            .with_status(200)
            .with_body(
                json!([
                    {"entity_id": "sensor.delta_2_main_battery_level", "state": "64", "attributes": {}},
                    {"entity_id": "sensor.delta_2_charge_remaining_time", "state": "95", "attributes": {}}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let store = Arc::new(ReportStore::new());
        let report = runner(server.url(), store.clone()).tick().await.unwrap();

        assert_eq!(report.batteries[0].percent, 64.0);
        assert_eq!(report.batteries[0].time_label.as_deref(), Some("1h 35m"));
        assert_eq!(store.latest(), Some(report));
        assert!(store.is_fresh(Utc::now(), Duration::from_secs(60)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_tick_keeps_store_untouched() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/states")
            .with_status(503)
            .create_async()
            .await;

        let store = Arc::new(ReportStore::new());
        let result = runner(server.url(), store.clone()).tick().await;

        assert!(result.is_err());
        assert!(store.latest().is_none());
        assert!(!store.is_fresh(Utc::now(), Duration::from_secs(60)));
        mock.assert_async().await;
    }

    #[test]
    fn test_store_freshness() {
        let store = ReportStore::new();
        let evaluated_at = Utc::now() - chrono::Duration::minutes(10);
        let report = CardReport {
            evaluated_at,
            selected_battery: 0,
            palette: eco_battery_types::Palette::default(),
            show_state: true,
            batteries: Vec::new(),
            outage: eco_battery_types::OutageReport {
                status: eco_battery_types::OutageStatus::inactive(),
                end_time_label: None,
                remaining_label: None,
            },
            next_outage: eco_battery_types::NextOutageReport {
                next: eco_battery_types::NextOutage::unknown(),
                start_time_label: None,
                until_label: None,
            },
            analysis: AnalysisResult::default(),
        };

        assert_eq!(store.publish(report.clone()), None);
        assert_eq!(store.record_failure(), 1);
        assert_eq!(store.record_failure(), 2);
        assert!(store.is_fresh(Utc::now(), Duration::from_secs(900)));
        assert!(!store.is_fresh(Utc::now(), Duration::from_secs(300)));
        assert_eq!(store.publish(report), Some(AnalysisResult::default()));
    }

    #[test]
    fn test_analysis_changed() {
        let ok = AnalysisResult::default();
        let critical = AnalysisResult {
            warning_level: WarningLevel::Critical,
            message: "⚠️ Delta 2 may run out 20m before outage ends!".to_owned(),
            ..AnalysisResult::default()
        };
        let shorter = AnalysisResult {
            message: "⚠️ Delta 2 may run out 15m before outage ends!".to_owned(),
            ..critical.clone()
        };

        assert!(analysis_changed(None, &ok));
        assert!(!analysis_changed(Some(&ok), &ok));
        assert!(analysis_changed(Some(&ok), &critical));
        assert!(analysis_changed(Some(&critical), &shorter));
    }
}
