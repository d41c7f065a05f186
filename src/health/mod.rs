//! Liveness and readiness endpoints backed by a cached health snapshot.
//!
//! A background task refreshes the snapshot on an interval; the readiness
//! and details endpoints additionally refresh on demand so orchestrators
//! never act on stale data.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::db;

const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Degraded,
    Down,
}

/// One checked dependency, with how long the probe took.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// The cached view served by every health endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
    pub components: BTreeMap<String, ComponentHealth>,
}

#[derive(Clone)]
pub struct HealthState {
    db: Arc<DatabaseConnection>,
    snapshot: Arc<RwLock<HealthSnapshot>>,
    started: Instant,
}

impl HealthState {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            snapshot: Arc::new(RwLock::new(HealthSnapshot {
                status: HealthStatus::Up,
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_seconds: 0,
                timestamp: Utc::now(),
                components: BTreeMap::new(),
            })),
            started: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Probes every dependency and swaps the cached snapshot.
    pub async fn refresh(&self) {
        let database = self.probe_database().await;

        let mut snapshot = self.snapshot.write().await;
        snapshot.timestamp = Utc::now();
        snapshot.uptime_seconds = self.uptime_seconds();
        snapshot.components.insert("database".to_string(), database);

        snapshot.status = if snapshot
            .components
            .values()
            .any(|c| c.status == HealthStatus::Down)
        {
            HealthStatus::Down
        } else if snapshot
            .components
            .values()
            .any(|c| c.status == HealthStatus::Degraded)
        {
            HealthStatus::Degraded
        } else {
            HealthStatus::Up
        };
    }

    async fn probe_database(&self) -> ComponentHealth {
        let start = Instant::now();
        let result = db::check_connection(&self.db).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => ComponentHealth {
                status: HealthStatus::Up,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => ComponentHealth {
                status: HealthStatus::Down,
                latency_ms,
                message: Some(e.to_string()),
                checked_at: Utc::now(),
            },
        }
    }

    async fn read(&self) -> HealthSnapshot {
        self.snapshot.read().await.clone()
    }
}

fn status_code_for(status: HealthStatus) -> StatusCode {
    match status {
        // Degraded still serves traffic but shows up in the body
        HealthStatus::Up | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Summary from the cached snapshot, no probing on the hot path.
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let snapshot = state.read().await;
    (
        status_code_for(snapshot.status),
        Json(json!({
            "status": snapshot.status,
            "version": snapshot.version,
            "timestamp": snapshot.timestamp,
        })),
    )
}

/// Probes dependencies before answering so a dead database flips readiness
/// immediately, not on the next refresh tick.
pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    state.refresh().await;
    let snapshot = state.read().await;
    (
        status_code_for(snapshot.status),
        Json(json!({
            "ready": snapshot.status == HealthStatus::Up,
            "timestamp": snapshot.timestamp,
        })),
    )
}

/// Process-is-alive check; never touches dependencies.
pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "alive": true,
            "uptime_seconds": state.uptime_seconds(),
            "timestamp": Utc::now(),
        })),
    )
}

/// Full snapshot including per-component latencies.
pub async fn detailed_health(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    state.refresh().await;
    let snapshot = state.read().await;
    (status_code_for(snapshot.status), Json(snapshot))
}

/// Periodic refresh loop; noisy only when something is wrong.
pub async fn run_health_checker(state: Arc<HealthState>) {
    info!("Starting periodic health checker");
    let mut interval = tokio::time::interval(REFRESH_INTERVAL);

    loop {
        interval.tick().await;
        state.refresh().await;

        let snapshot = state.read().await;
        if snapshot.status != HealthStatus::Up {
            warn!(status = ?snapshot.status, "System health is not optimal");
            for (name, component) in &snapshot.components {
                if component.status != HealthStatus::Up {
                    warn!(
                        component = %name,
                        status = ?component.status,
                        message = component.message.as_deref().unwrap_or(""),
                        "Component is not healthy"
                    );
                }
            }
        }
    }
}

/// Builds the `/health` router and starts the background refresher.
pub fn health_routes_with_state(db: Arc<DatabaseConnection>) -> Router {
    let state = Arc::new(HealthState::new(db));
    tokio::spawn(run_health_checker(state.clone()));

    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/details", get(detailed_health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_component_maps_to_service_unavailable() {
        assert_eq!(
            status_code_for(HealthStatus::Down),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_code_for(HealthStatus::Up), StatusCode::OK);
        assert_eq!(status_code_for(HealthStatus::Degraded), StatusCode::OK);
    }

    #[test]
    fn health_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }
}
