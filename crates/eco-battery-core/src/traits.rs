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

use eco_battery_types::{SensorReading, SensorSnapshot};
use std::collections::HashMap;

/// Resolves entity ids to the readings captured for the current evaluation
///
/// A missing entity is `None`, never an error: the pipeline treats it exactly
/// like a sensor reporting `unknown`.
pub trait SensorSource {
    fn reading(&self, entity_id: &str) -> Option<&SensorReading>;

    /// Usable state of an optional entity reference
    fn value_of(&self, entity_id: Option<&str>) -> Option<&str> {
        self.reading(entity_id?)?.value()
    }
}

impl SensorSource for SensorSnapshot {
    fn reading(&self, entity_id: &str) -> Option<&SensorReading> {
        self.get(entity_id)
    }
}

impl SensorSource for HashMap<String, SensorReading> {
    fn reading(&self, entity_id: &str) -> Option<&SensorReading> {
        self.get(entity_id)
    }
}

impl<S: SensorSource + ?Sized> SensorSource for &S {
    fn reading(&self, entity_id: &str) -> Option<&SensorReading> {
        (**self).reading(entity_id)
    }
}
