// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor guarding views that only a fresh signup may see.
//!
//! ```rust,ignore
//! async fn otp_page(SignupToken(claims): SignupToken) -> impl IntoResponse {
//!     // claims.subject is the user who just signed up
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    cookie::{self, CookiePolicy},
    models::{DenyAction, DenyResponse},
    state::AppState,
    token::{ClaimSet, VerifyError},
};

/// Why the guard refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No `token` cookie was presented
    MissingToken,
    /// A token was presented but did not verify
    Invalid {
        error: VerifyError,
        cookie_policy: CookiePolicy,
    },
}

impl GateRejection {
    pub fn error_code(&self) -> &'static str {
        match self {
            GateRejection::MissingToken => "missing_token",
            GateRejection::Invalid { error, .. } => error.error_code(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GateRejection::MissingToken => StatusCode::UNAUTHORIZED,
            GateRejection::Invalid { error, .. } => error.status_code(),
        }
    }

    pub fn action(&self) -> DenyAction {
        match self {
            GateRejection::MissingToken => DenyAction::Signup,
            GateRejection::Invalid { error, .. } if error.is_recoverable() => DenyAction::Resend,
            GateRejection::Invalid { .. } => DenyAction::Deny,
        }
    }

    fn message(&self) -> &'static str {
        match self.action() {
            DenyAction::Signup => "Please complete signup first",
            DenyAction::Resend => "Your code has expired, please request a new one",
            DenyAction::Deny => "Access denied",
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let body = Json(DenyResponse {
            success: false,
            message: self.message().to_string(),
            error_code: self.error_code().to_string(),
            action: self.action(),
        });

        let mut headers = HeaderMap::new();
        if let GateRejection::Invalid { cookie_policy, .. } = self {
            if self.action() == DenyAction::Deny {
                if let Err(e) = cookie::clear(&mut headers, cookie_policy) {
                    warn!(error = %e, "Failed to build clearing cookie");
                }
            }
        }

        (self.status_code(), headers, body).into_response()
    }
}

/// Verify the token cookie in `headers` at `now` (Unix seconds).
pub fn verify_request_at(
    state: &AppState,
    headers: &HeaderMap,
    now: i64,
) -> Result<ClaimSet, GateRejection> {
    let token = cookie::extract(headers).ok_or(GateRejection::MissingToken)?;

    state.verifier.verify_at(&token, now).map_err(|error| {
        if error.is_recoverable() {
            info!(error_code = error.error_code(), "Signup token expired");
        } else {
            warn!(error_code = error.error_code(), "Rejected signup token");
        }
        GateRejection::Invalid {
            error,
            cookie_policy: state.cookie_policy,
        }
    })
}

/// Claims of the verified signup token on the current request.
pub struct SignupToken(pub ClaimSet);

impl FromRequestParts<AppState> for SignupToken {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify_request_at(state, &parts.headers, Utc::now().timestamp()).map(SignupToken)
    }
}
