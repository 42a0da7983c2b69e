// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issuance boundary: subject in, signed cookie out.
//!
//! Each call is independent and walks
//! `Received -> Validated -> Issued -> Self-checked -> Cookie-attached`,
//! leaving early with an [`ApiError`] at the validation or issuing step.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{debug, error, info};

use crate::{
    cookie,
    error::ApiError,
    models::IssuanceResponse,
    state::AppState,
    token::{ClaimSet, IssueError, IssuedToken},
};

/// Message returned when no subject identifier was supplied.
pub const MISSING_SUBJECT_MESSAGE: &str = "UserId is required";

/// Successful issuance, ready to be sent as a response.
#[derive(Debug)]
pub struct Issued {
    pub claims: ClaimSet,
    pub headers: HeaderMap,
}

impl IntoResponse for Issued {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.headers, Json(IssuanceResponse::created())).into_response()
    }
}

/// Issue a signup token for `subject_identifier` and attach it as a cookie.
pub fn handle(state: &AppState, subject_identifier: Option<&str>) -> Result<Issued, ApiError> {
    handle_at(state, subject_identifier, Utc::now().timestamp())
}

/// [`handle`] with an explicit clock (Unix seconds).
pub fn handle_at(
    state: &AppState,
    subject_identifier: Option<&str>,
    now: i64,
) -> Result<Issued, ApiError> {
    let subject = match subject_identifier {
        Some(subject) if !subject.is_empty() => subject,
        _ => return Err(ApiError::bad_request(MISSING_SUBJECT_MESSAGE)),
    };

    let issued = state.issuer.issue_at(subject, now).map_err(|e| match e {
        IssueError::Validation(message) => ApiError::bad_request(message),
        err @ IssueError::Configuration(_) => {
            error!(error = %err, subject, "Token issuance failed");
            ApiError::internal()
        }
    })?;

    self_check(state, &issued, now);

    let mut headers = HeaderMap::new();
    cookie::attach(&mut headers, &issued, state.cookie_policy, now).map_err(|e| {
        error!(error = %e, subject, "Issued token could not be encoded as a cookie");
        ApiError::internal()
    })?;

    info!(
        subject,
        expires_at = issued.claims.expires_at,
        "Signup token issued"
    );

    Ok(Issued {
        claims: issued.claims,
        headers,
    })
}

/// Verify a freshly issued token. Failure is logged and counted; it never
/// changes the response, the token is still handed out.
fn self_check(state: &AppState, issued: &IssuedToken, now: i64) {
    match state.verifier.verify_at(&issued.token, now) {
        Ok(claims) if claims == issued.claims => {
            debug!(subject = %claims.subject, "Token self-check passed");
        }
        Ok(claims) => {
            let anomalies = state.self_check.record_anomaly();
            error!(
                expected_subject = %issued.claims.subject,
                actual_subject = %claims.subject,
                anomalies,
                "Token self-check returned different claims than were issued"
            );
        }
        Err(e) => {
            let anomalies = state.self_check.record_anomaly();
            error!(
                error = %e,
                error_code = e.error_code(),
                subject = %issued.claims.subject,
                anomalies,
                "Token self-check failed: issuer and verifier disagree"
            );
        }
    }
}
