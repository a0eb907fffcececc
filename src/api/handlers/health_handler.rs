//! Health check handlers.

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::AppState;

/// Individual dependency status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    fn from_check<E: std::fmt::Display>(result: Result<(), E>, started: Instant) -> Self {
        let latency_ms = Some(started.elapsed().as_millis() as u64);
        match result {
            Ok(()) => Self {
                status: "healthy",
                latency_ms,
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                latency_ms,
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Serialize)]
pub struct Dependencies {
    pub database: ServiceHealth,
    pub cache: ServiceHealth,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub services: Dependencies,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.services.database.is_healthy() && self.services.cache.is_healthy()
    }
}

/// Ping the database and the counter store, timing each round trip.
pub async fn check_services(state: &AppState) -> HealthResponse {
    let started = Instant::now();
    let database = ServiceHealth::from_check(state.database.ping().await, started);

    let started = Instant::now();
    let cache = ServiceHealth::from_check(state.rate_limits.ping().await, started);

    let healthy = database.is_healthy() && cache.is_healthy();
    if !healthy {
        tracing::warn!(
            database = database.status,
            cache = cache.status,
            "Health check degraded"
        );
    }

    HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        timestamp: Utc::now(),
        services: Dependencies { database, cache },
    }
}

/// Public health endpoint, 503 when a dependency is down
pub async fn health_check(State(state): State<AppState>) -> Response {
    let report = check_services(&state).await;

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report)).into_response()
}
