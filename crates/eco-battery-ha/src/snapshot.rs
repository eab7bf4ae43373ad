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

//! Sensor snapshots captured from Home Assistant for one evaluation.

use crate::client::HomeAssistantClient;
use crate::errors::HaResult;
use eco_battery_types::{CardConfig, SensorReading, SensorSnapshot};
use tracing::{debug, warn};

/// Captures the entities a card references from Home Assistant
#[derive(Debug, Clone)]
pub struct HaSnapshotAdapter {
    client: HomeAssistantClient,
}

impl HaSnapshotAdapter {
    pub fn new(client: HomeAssistantClient) -> Self {
        Self { client }
    }

    /// Fetch every referenced entity in a single `/api/states` call
    ///
    /// Entities Home Assistant does not know are left out of the snapshot and
    /// read as missing downstream.
    pub async fn fetch_snapshot(&self, config: &CardConfig) -> HaResult<SensorSnapshot> {
        let wanted = config.entity_ids();
        let states = self.client.get_all_states().await?;

        let snapshot: SensorSnapshot = states
            .into_iter()
            .filter(|state| wanted.contains(&state.entity_id))
            .map(|state| (state.entity_id.clone(), SensorReading::from(state)))
            .collect();

        let missing: Vec<&str> = wanted
            .iter()
            .map(String::as_str)
            .filter(|entity_id| snapshot.get(entity_id).is_none())
            .collect();
        if !missing.is_empty() {
            warn!("⚠️ Entities not found in Home Assistant: {:?}", missing);
        }

        debug!(
            "📸 Captured {}/{} referenced entities",
            snapshot.len(),
            wanted.len()
        );
        Ok(snapshot)
    }
}
