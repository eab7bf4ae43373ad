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

mod config;
mod runner;
mod web;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::{AppConfig, ValidationIssue};
use eco_battery_ha::{HaSnapshotAdapter, HomeAssistantClient};
use runner::{ReportStore, Runner};
use web::ApiState;

/// Report is considered stale after this many missed refreshes
const STALE_AFTER_INTERVALS: u32 = 3;

/// Battery runtime vs. grid outage monitor for Home Assistant
#[derive(Parser, Debug)]
#[command(name = "eco-battery", version, about)]
struct Args {
    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate once, print the report as JSON and exit
    #[arg(long)]
    once: bool,

    /// Override the report API port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = AppConfig::load(args.config.as_deref())?;
    let config = loaded.config;
    init_tracing(&config.system.log_level)?;

    info!("🚀 Starting Eco Battery v{}", env!("CARGO_PKG_VERSION"));
    info!("✅ Loaded configuration from {}", loaded.origin);
    log_summary(&config, &loaded.warnings);

    let client = if std::env::var("SUPERVISOR_TOKEN").is_ok() {
        info!("🏠 Initializing HA client using Supervisor API...");
        HomeAssistantClient::from_supervisor()?
    } else {
        info!("🏠 Initializing HA client from configuration...");
        HomeAssistantClient::from_config(
            config.system.ha_base_url.clone(),
            config.system.ha_token.clone(),
        )?
    };

    let tz = resolve_timezone(&config, &client).await;
    let store = Arc::new(ReportStore::new());
    let runner = Runner::new(
        HaSnapshotAdapter::new(client),
        config.card.clone(),
        tz,
        store.clone(),
    );

    if args.once {
        let report = runner
            .tick()
            .await
            .context("Failed to evaluate battery card")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if config.system.web_enabled {
        let port = args.port.unwrap_or(config.system.web_port);
        let state = ApiState::new(
            store,
            config.update_interval().saturating_mul(STALE_AFTER_INTERVALS),
        );
        tokio::spawn(async move {
            if let Err(e) = web::start_web_server(state, port).await {
                error!("❌ Report API stopped: {:#}", e);
            }
        });
    }

    info!(
        "⏱️ Refreshing every {}s",
        config.system.update_interval_secs
    );
    tokio::select! {
        () = runner.run(config.update_interval()) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("👋 Shutting down");
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting default subscriber failed")
}

fn log_summary(config: &AppConfig, warnings: &[ValidationIssue]) {
    let card = &config.card;
    info!("📋 Configuration Summary:");
    info!("   Batteries: {}", card.batteries.len());
    for (index, battery) in card.batteries.iter().enumerate() {
        let marker = if index == card.selected_battery { "*" } else { " " };
        info!(
            "   {} {} [{}]",
            marker,
            battery.display_name(index),
            battery.entity
        );
    }
    info!(
        "   Outage status: {}",
        card.outage_status_entity.as_deref().unwrap_or("-")
    );
    info!(
        "   Outage end: {}",
        card.outage_end_time_entity.as_deref().unwrap_or("-")
    );
    info!(
        "   Next outage: {}",
        card.next_outage_time_entity.as_deref().unwrap_or("-")
    );
    info!(
        "   Update interval: {}s",
        config.system.update_interval_secs
    );

    for issue in warnings {
        warn!("⚠️ Config {}: {}", issue.field, issue.message);
    }
}

/// Configured timezone, else Home Assistant's, else UTC
async fn resolve_timezone(config: &AppConfig, client: &HomeAssistantClient) -> Tz {
    if let Some(tz) = config.timezone() {
        info!("🌍 Using configured timezone: {}", tz);
        return tz;
    }

    match client.get_timezone().await {
        Ok(name) => match name.parse::<Tz>() {
            Ok(tz) => {
                info!("🌍 Using Home Assistant timezone: {}", tz);
                tz
            }
            Err(e) => {
                warn!("⚠️ Unknown Home Assistant timezone '{}' ({}), using UTC", name, e);
                Tz::UTC
            }
        },
        Err(e) => {
            warn!("⚠️ Failed to fetch timezone from HA ({}), times will be interpreted in UTC", e);
            Tz::UTC
        }
    }
}
