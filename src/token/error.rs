// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification errors.

use axum::http::StatusCode;

/// Errors returned by [`TokenIssuer`](super::TokenIssuer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueError {
    /// The subject handed to the issuer was unusable.
    #[error("{0}")]
    Validation(String),

    /// The signing key could not be used to sign.
    #[error("Token signing is misconfigured: {0}")]
    Configuration(String),
}

/// Errors returned by [`TokenVerifier`](super::TokenVerifier).
///
/// The three kinds stay distinct so a guard can offer a resend path for
/// expired tokens while refusing tampered or garbled ones outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Token was well-formed and correctly signed but is past its expiry.
    #[error("Token has expired")]
    Expired,

    /// Signature does not match the signing key or declared algorithm.
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Token could not be decoded or is missing required claims.
    #[error("Token is malformed")]
    Malformed,
}

impl VerifyError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            VerifyError::Expired => "token_expired",
            VerifyError::InvalidSignature => "invalid_signature",
            VerifyError::Malformed => "malformed_token",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerifyError::Expired => StatusCode::UNAUTHORIZED,
            VerifyError::InvalidSignature | VerifyError::Malformed => StatusCode::FORBIDDEN,
        }
    }

    /// Whether the holder can recover by requesting a fresh code.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VerifyError::Expired)
    }
}
