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

mod validation;

pub use validation::{ValidationIssue, ValidationResult};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use eco_battery_types::{BatterySpec, CardConfig, CardConfigError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options file written by the Home Assistant Supervisor for addons
pub const ADDON_OPTIONS_PATH: &str = "/data/options.json";

/// Development config files, tried in order after the addon options
const LOCAL_CONFIG_FILES: [&str; 2] = ["config.toml", "config.json"];

const MIN_UPDATE_INTERVAL_SECS: u64 = 10;
const MAX_SENSIBLE_UPDATE_INTERVAL_SECS: u64 = 3600;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Battery card: batteries, outage sensors, display and analysis settings
    #[serde(default)]
    pub card: CardConfig,

    #[serde(default)]
    pub system: SystemConfig,
}

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Polling interval (seconds)
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Home Assistant base URL (optional, defaults to supervisor)
    #[serde(default)]
    pub ha_base_url: Option<String>,

    /// Home Assistant token (optional, uses SUPERVISOR_TOKEN if not set)
    #[serde(default)]
    pub ha_token: Option<String>,

    /// IANA timezone for offset-less sensor times; fetched from HA when unset
    #[serde(default)]
    pub timezone: Option<String>,

    /// Serve the report API
    #[serde(default = "default_web_enabled")]
    pub web_enabled: bool,

    #[serde(default = "default_web_port")]
    pub web_port: u16,
}

fn default_update_interval_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_web_enabled() -> bool {
    true
}

fn default_web_port() -> u16 {
    8099
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval_secs(),
            log_level: default_log_level(),
            ha_base_url: None,
            ha_token: None,
            timezone: None,
            web_enabled: default_web_enabled(),
            web_port: default_web_port(),
        }
    }
}

/// A validated, normalized configuration and how it was obtained
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub origin: ConfigOrigin,
    /// Warnings found before normalization adjusted the values
    pub warnings: Vec<ValidationIssue>,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    AddonOptions,
    File(PathBuf),
    Environment,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddonOptions => write!(f, "HA addon options ({ADDON_OPTIONS_PATH})"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Environment => f.write_str("defaults with environment overrides"),
        }
    }
}

impl AppConfig {
    /// Load, validate and normalize the configuration
    ///
    /// Order: explicit path, HA addon options, `config.toml`, `config.json`,
    /// then defaults with environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
        let loaded = |(config, warnings): (Self, Vec<ValidationIssue>), origin| LoadedConfig {
            config,
            origin,
            warnings,
        };

        if let Some(path) = explicit {
            let prepared = Self::load_from(path)?;
            return Ok(loaded(prepared, ConfigOrigin::File(path.to_path_buf())));
        }

        let addon_options = Path::new(ADDON_OPTIONS_PATH);
        if addon_options.is_file() {
            let prepared = Self::load_from(addon_options)?;
            return Ok(loaded(prepared, ConfigOrigin::AddonOptions));
        }

        for candidate in LOCAL_CONFIG_FILES {
            let path = Path::new(candidate);
            if path.is_file() {
                let prepared = Self::load_from(path)?;
                return Ok(loaded(prepared, ConfigOrigin::File(path.to_path_buf())));
            }
        }

        let prepared = Self::from_env().prepare()?;
        Ok(loaded(prepared, ConfigOrigin::Environment))
    }

    /// Load a single file; TOML when the extension says so, JSON otherwise
    ///
    /// Returns the normalized config with the warnings raised by the values
    /// as written.
    pub fn load_from(path: &Path) -> Result<(Self, Vec<ValidationIssue>)> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_toml = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));
        let config: Self = if is_toml {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };

        config.prepare()
    }

    /// Defaults with environment overrides (development/testing)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(entity) = lookup("EB_BATTERY_ENTITY") {
            config.card.batteries = vec![BatterySpec::new(entity)];
        }
        if let Some(interval) = lookup("UPDATE_INTERVAL_SECS")
            && let Ok(secs) = interval.parse::<u64>()
        {
            config.system.update_interval_secs = secs;
        }
        if let Some(url) = lookup("HA_BASE_URL") {
            config.system.ha_base_url = Some(url);
        }
        if let Some(token) = lookup("HA_TOKEN") {
            config.system.ha_token = Some(token);
        }

        config
    }

    fn prepare(mut self) -> Result<(Self, Vec<ValidationIssue>)> {
        let warnings = self.validate()?;
        self.card = self
            .card
            .normalize()
            .context("Invalid battery card configuration")?;
        Ok((self, warnings))
    }

    /// Validate configuration with field-level errors and warnings
    pub fn validate_detailed(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        let card = &self.card;

        if card.batteries.is_empty() {
            result.add_error("card.batteries", CardConfigError::NoBatteries.to_string());
        }
        for (index, battery) in card.batteries.iter().enumerate() {
            if battery.entity.trim().is_empty() {
                result.add_error(
                    format!("card.batteries[{index}].entity"),
                    CardConfigError::MissingEntity { index }.to_string(),
                );
            }
        }
        if !card.batteries.is_empty() && card.selected_battery >= card.batteries.len() {
            result.add_warning(
                "card.selected_battery",
                format!(
                    "Selected battery {} does not exist, using battery {}",
                    card.selected_battery,
                    card.batteries.len() - 1
                ),
            );
        }

        if card.yellow > card.green {
            result.add_warning(
                "card.yellow",
                format!(
                    "Yellow threshold ({}%) is above green threshold ({}%)",
                    card.yellow, card.green
                ),
            );
        }
        if !(0.0..=100.0).contains(&card.analysis.charge_ready_percent) {
            result.add_error(
                "card.analysis.charge_ready_percent",
                "Charge-ready threshold must be between 0 and 100",
            );
        }
        if card
            .outage_status_entity
            .as_deref()
            .is_none_or(|entity| entity.trim().is_empty())
        {
            result.add_warning(
                "card.outage_status_entity",
                "No outage status sensor configured, outage analysis is limited to the next outage",
            );
        }

        if self.system.update_interval_secs < MIN_UPDATE_INTERVAL_SECS {
            result.add_error(
                "system.update_interval_secs",
                format!("Update interval must be at least {MIN_UPDATE_INTERVAL_SECS} seconds"),
            );
        } else if self.system.update_interval_secs > MAX_SENSIBLE_UPDATE_INTERVAL_SECS {
            result.add_warning(
                "system.update_interval_secs",
                format!(
                    "Value is very high ({}s), outage times will lag behind",
                    self.system.update_interval_secs
                ),
            );
        }

        if !LOG_LEVELS.contains(&self.system.log_level.to_lowercase().as_str()) {
            result.add_warning(
                "system.log_level",
                format!(
                    "Unknown log level '{}' (expected one of: {})",
                    self.system.log_level,
                    LOG_LEVELS.join(", ")
                ),
            );
        }

        if let Some(timezone) = &self.system.timezone
            && timezone.parse::<Tz>().is_err()
        {
            result.add_error(
                "system.timezone",
                format!("Unknown timezone '{timezone}'"),
            );
        }

        if self.system.web_enabled && self.system.web_port == 0 {
            result.add_error("system.web_port", "Web port cannot be 0");
        }

        result
    }

    /// Validate configuration, failing on the first error found
    ///
    /// On success the warnings are returned for the caller to report.
    pub fn validate(&self) -> Result<Vec<ValidationIssue>> {
        let result = self.validate_detailed();
        if let Some(issue) = result.errors.first() {
            anyhow::bail!("{}: {}", issue.field, issue.message);
        }
        Ok(result.warnings)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.system.update_interval_secs)
    }

    /// Configured timezone, if set and valid
    pub fn timezone(&self) -> Option<Tz> {
        self.system.timezone.as_deref()?.parse().ok()
    }
}
