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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current grid outage as reported by the outage sensors
///
/// `end_time` and `minutes_remaining` are only ever populated while `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutageStatus {
    pub active: bool,
    pub end_time: Option<DateTime<Utc>>,
    pub minutes_remaining: Option<u32>,
}

impl OutageStatus {
    /// No outage (or no outage sensor)
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Active outage with unknown end
    pub fn active() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    /// Active outage ending at `end_time`, `minutes_remaining` from now
    pub fn active_until(end_time: DateTime<Utc>, minutes_remaining: u32) -> Self {
        Self {
            active: true,
            end_time: Some(end_time),
            minutes_remaining: Some(minutes_remaining),
        }
    }
}

/// Next scheduled outage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NextOutage {
    pub start_time: Option<DateTime<Utc>>,
    pub minutes_until: Option<u32>,
}

impl NextOutage {
    /// Nothing scheduled or the schedule sensor is unusable
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn at(start_time: DateTime<Utc>, minutes_until: u32) -> Self {
        Self {
            start_time: Some(start_time),
            minutes_until: Some(minutes_until),
        }
    }
}
