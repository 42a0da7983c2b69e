// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OTP token endpoints.

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use tracing::warn;

use crate::{
    error::ApiError,
    gate::{self, Issued, SignupToken},
    models::{DenyResponse, IssuanceRequest, IssuanceResponse, VerificationResponse},
    state::AppState,
};

const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Issue a signup token and set it as the `token` cookie.
///
/// Called by the signup flow once the account has been created. The body
/// is parsed as JSON whatever its `Content-Type`; a bare browser `fetch`
/// sends `text/plain`.
#[utoipa::path(
    post,
    path = "/v1/otp-token",
    request_body = IssuanceRequest,
    tag = "OTP Token",
    responses(
        (status = 200, description = "Token issued; `token` cookie set", body = IssuanceResponse),
        (status = 400, description = "Missing user ID or invalid body", body = IssuanceResponse),
        (status = 500, description = "Token could not be issued", body = IssuanceResponse),
    )
)]
pub async fn issue_otp_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Issued, ApiError> {
    let request = parse_request(&body)?;
    gate::handle(&state, request.user_id.as_deref())
}

fn parse_request(body: &[u8]) -> Result<IssuanceRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected issuance request body");
        ApiError::bad_request(INVALID_BODY_MESSAGE)
    })
}

/// Check the `token` cookie and return its claims.
///
/// Used by the OTP view before rendering. Expired tokens answer 401 with
/// action `resend`; tampered or malformed tokens answer 403 with action
/// `deny` and clear the cookie.
#[utoipa::path(
    get,
    path = "/v1/otp-token/verify",
    tag = "OTP Token",
    responses(
        (status = 200, description = "Token is valid", body = VerificationResponse),
        (status = 401, description = "Token missing or expired", body = DenyResponse),
        (status = 403, description = "Token tampered or malformed", body = DenyResponse),
    )
)]
pub async fn verify_otp_token(SignupToken(claims): SignupToken) -> Json<VerificationResponse> {
    Json(VerificationResponse::from_claims(claims, Utc::now().timestamp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::{
        body::to_bytes,
        http::{header::SET_COOKIE, StatusCode},
        response::IntoResponse,
    };

    #[tokio::test]
    async fn issue_sets_cookie_and_reports_success() {
        let state = test_state();
        let body = Bytes::from_static(br#"{"userId":"user123"}"#);
        let response = issue_otp_token(State(state), body)
            .await
            .expect("issuance succeeds")
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_some());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: IssuanceResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, IssuanceResponse::created());
    }

    #[tokio::test]
    async fn issue_without_user_id_is_bad_request() {
        let err = issue_otp_token(State(test_state()), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "UserId is required");
    }

    #[test]
    fn request_accepts_subject_identifier_alias() {
        let request = parse_request(br#"{"subjectIdentifier":"user123"}"#).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("user123"));
    }

    #[test]
    fn non_string_user_id_is_invalid_body() {
        let bodies: [&[u8]; 3] = [br#"{"userId":42}"#, br#"["user123"]"#, b"user123"];
        for body in bodies {
            let err = parse_request(body).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message, INVALID_BODY_MESSAGE);
        }
    }
}
