//! HTTP API, health endpoints and Prometheus metrics
//!
//! This module serves the discovery operations as JSON over Axum, next to
//! the health probes and the metrics scrape endpoint.

use crate::catalog::FilterParams;
use crate::error::DiscoveryError;
use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use crate::types::{CatalogKind, RatingObservation, SkillLevel};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Body of `POST /pairings`; an empty body pairs the whole pool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PairingRequest {
    pub skill_level: Option<SkillLevel>,
}

/// API server bound to the configured host and port
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self { state, shutdown_tx }
    }

    /// Serve until [`ApiServer::stop`] is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = self
            .state
            .config()
            .bind_address()
            .parse()
            .context("Invalid HTTP server address")?;

        let app = create_router(self.state.clone());
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("API server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API server shutdown signal received");
            })
            .await?;

        info!("API server stopped");
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        info!("Stopping API server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to API server: {}", e);
        }

        Ok(())
    }
}

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/live", get(live_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .route("/catalog/{kind}", get(catalog_handler))
        .route("/items/{id}/join", post(join_handler))
        .route("/ratings", post(rating_handler))
        .route("/pairings", post(pairing_handler))
        .with_state(state)
}

/// Map an error to a status code, using the discovery taxonomy when present
fn error_response(err: anyhow::Error) -> Response {
    let status = match err.downcast_ref::<DiscoveryError>() {
        Some(DiscoveryError::InvalidFilterSpec { .. })
        | Some(DiscoveryError::UnknownCatalogKind { .. }) => StatusCode::BAD_REQUEST,
        Some(DiscoveryError::InvalidObservation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(DiscoveryError::EntityNotFound { .. }) => StatusCode::NOT_FOUND,
        Some(DiscoveryError::ItemFull { .. }) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {:#}", err);
    } else {
        debug!("Request rejected: {}", err);
    }

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": state.config().service.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/live",
            "/ready",
            "/metrics",
            "/catalog/{kind}",
            "/items/{id}/join",
            "/ratings",
            "/pairings"
        ]
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    debug!("Health check requested");

    match HealthCheck::check(state).await {
        Ok(health) => {
            let status = if health.status == HealthStatus::Unhealthy {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            };
            (status, Json(health)).into_response()
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
                .into_response()
        }
    }
}

async fn live_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match HealthCheck::liveness_check(state).await {
        Ok(HealthStatus::Unhealthy) | Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
        Ok(_) => (StatusCode::OK, "Alive"),
    }
}

async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match HealthCheck::readiness_check(state).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
        Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
        }
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    debug!("Metrics endpoint requested");

    let metrics = state.metrics();
    metrics.update_uptime(state.uptime());

    let metric_families = metrics.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            output,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

async fn catalog_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<FilterParams>,
) -> Response {
    let request = kind
        .parse::<CatalogKind>()
        .and_then(|kind| params.into_request().map(|(spec, sort)| (kind, spec, sort)));

    let (kind, spec, sort) = match request {
        Ok(request) => request,
        Err(e) => return error_response(e.into()),
    };

    match state.discovery().query_catalog(kind, &spec, sort).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => error_response(e),
    }
}

async fn join_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.discovery().check_joinable(&id).await {
        Ok(item) => Json(json!({
            "item_id": item.id,
            "joinable": true,
            "open_spots": item.open_spots()
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn rating_handler(
    State(state): State<Arc<AppState>>,
    Json(observation): Json<RatingObservation>,
) -> Response {
    match state.discovery().submit_rating(observation).await {
        Ok(update) => Json(update).into_response(),
        Err(e) => error_response(e),
    }
}

async fn pairing_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        PairingRequest::default()
    } else {
        match serde_json::from_slice::<PairingRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Invalid pairing request: {}", e) })),
                )
                    .into_response()
            }
        }
    };

    match state.discovery().propose_pairs(request.skill_level).await {
        Ok(proposal) => Json(proposal).into_response(),
        Err(e) => error_response(e),
    }
}
