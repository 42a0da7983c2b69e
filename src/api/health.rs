// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
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
    /// Fingerprint of the loaded signing key (never the key itself).
    pub signing_key: String,
    /// "ok", or "anomalies" once an issued token failed its own verification.
    pub self_check: String,
    /// Number of self-check failures since startup.
    pub self_check_anomalies: u64,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint handler.
///
/// Self-check anomalies show up as `degraded` but never change the status
/// code: issuance keeps working while they are investigated.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service status, `degraded` after self-check anomalies", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(report(&state))
}

fn report(state: &AppState) -> ReadyResponse {
    let anomalies = state.self_check.anomalies();
    let all_ok = anomalies == 0;

    ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            signing_key: state.key_fingerprint.to_string(),
            self_check: if all_ok { "ok" } else { "anomalies" }.to_string(),
            self_check_anomalies: anomalies,
        },
    }
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
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
/// The signing key is loaded before the router exists, so a running
/// instance is always ready.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(report(&state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[tokio::test]
    async fn healthy_without_anomalies() {
        let state = test_state();
        let Json(body) = health(State(state.clone())).await;

        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.signing_key, state.key_fingerprint.as_ref());
        assert_eq!(body.checks.self_check, "ok");
        assert_eq!(body.checks.self_check_anomalies, 0);
    }

    #[tokio::test]
    async fn health_reports_degraded_after_self_check_anomaly() {
        let state = test_state();
        state.self_check.record_anomaly();

        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.self_check, "anomalies");
        assert_eq!(body.checks.self_check_anomalies, 1);
    }

    #[tokio::test]
    async fn still_ready_after_self_check_anomalies() {
        let state = test_state();
        state.self_check.record_anomaly();
        state.self_check.record_anomaly();

        let Json(body) = readiness(State(state)).await;
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.self_check_anomalies, 2);
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        assert_eq!(liveness().await.0.status, "ok");
    }
}
