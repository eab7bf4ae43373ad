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

/// Severity of the outage analysis, ordered `Ok < Info < Warning < Critical`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    #[default]
    Ok,
    Info,
    Warning,
    Critical,
}

impl WarningLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Raise to at least `floor`; never lowers
    #[must_use]
    pub fn escalate(self, floor: Self) -> Self {
        self.max(floor)
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the outage readiness analysis
///
/// `None` means "not applicable / insufficient data", which is distinct from a
/// computed `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sufficient_for_outage: Option<bool>,
    pub can_charge_before_next: Option<bool>,
    pub warning_level: WarningLevel,
    pub message: String,
}

impl AnalysisResult {
    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered_by_severity() {
        assert!(WarningLevel::Critical > WarningLevel::Warning);
        assert!(WarningLevel::Warning > WarningLevel::Info);
        assert!(WarningLevel::Info > WarningLevel::Ok);
    }

    #[test]
    fn test_escalate_never_downgrades() {
        assert_eq!(
            WarningLevel::Critical.escalate(WarningLevel::Warning),
            WarningLevel::Critical
        );
        assert_eq!(
            WarningLevel::Ok.escalate(WarningLevel::Warning),
            WarningLevel::Warning
        );
        assert_eq!(WarningLevel::Info.to_string(), "info");
    }

    #[test]
    fn test_default_result_is_blank() {
        let result = AnalysisResult::default();
        assert_eq!(result.warning_level, WarningLevel::Ok);
        assert!(!result.has_message());
        assert!(result.sufficient_for_outage.is_none());
        assert!(result.can_charge_before_next.is_none());
    }
}
