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

//! Report API for the presentation layer.

use crate::runner::ReportStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ApiState {
    store: Arc<ReportStore>,
    /// Age after which `/health` reports the data as stale
    stale_after: Duration,
}

impl ApiState {
    pub fn new(store: Arc<ReportStore>, stale_after: Duration) -> Self {
        Self { store, stale_after }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/report", get(report_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive()) // Allow HA Ingress
        .with_state(state)
}

/// Serve the API until the listener fails
pub async fn start_web_server(state: ApiState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    info!("🌐 Starting report API on {addr}");
    info!("📱 Report: http://localhost:{}/api/report", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn report_handler(State(state): State<ApiState>) -> Response {
    match state.store.latest() {
        Some(report) => Json(report).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    if state.store.is_fresh(Utc::now(), state.stale_after) {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "STALE")
    }
}
