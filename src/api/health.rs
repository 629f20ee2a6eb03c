// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Record store backend ("postgrest", or "memory" when embedded).
    pub record_store: String,
    /// PayFast environment used for server-side validation.
    pub gateway: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn ready_response(state: &AppState) -> (bool, ReadyResponse) {
    let record_store = state.store.backend();
    // An in-memory store does not survive a restart.
    let store_ok = record_store != "memory";

    let response = ReadyResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            record_store: record_store.to_string(),
            gateway: if state.config.sandbox {
                "sandbox"
            } else {
                "production"
            }
            .to_string(),
        },
    };
    (store_ok, response)
}

/// Health check endpoint handler.
///
/// Always 200; the body reports which record store backs the service.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ready_response(&state).1)
}

/// Liveness probe handler.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 503 when the record store is not durable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Record store is not durable", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (ready, response) = ready_response(&state);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::{ItnConfig, Secret, StoreConfig};
    use crate::providers::PayFastClient;
    use crate::storage::InMemoryRegistrationStore;

    const VALIDATE_URL: &str = "http://127.0.0.1:1/validate";

    fn memory_state() -> AppState {
        let config = ItnConfig::new(VALIDATE_URL);
        let gateway = PayFastClient::from_config(&config).expect("gateway");
        AppState::new(config, gateway, Arc::new(InMemoryRegistrationStore::new()))
    }

    #[tokio::test]
    async fn readiness_reports_memory_store_as_unavailable() {
        let (status, Json(body)) = readiness(State(memory_state())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.record_store, "memory");
        assert_eq!(body.checks.gateway, "sandbox");
    }

    #[tokio::test]
    async fn readiness_is_ok_with_postgrest_store() {
        let mut config = ItnConfig::new(VALIDATE_URL);
        config.sandbox = false;
        config.store = Some(StoreConfig {
            url: "http://127.0.0.1:2".to_string(),
            service_role_key: Secret::new("service-key"),
        });
        let state = AppState::from_config(config).expect("state");

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.record_store, "postgrest");
        assert_eq!(body.checks.gateway, "production");
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }
}
