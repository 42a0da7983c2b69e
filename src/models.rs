// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the token endpoints. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Issuance**: the signup flow asks for a token, gets `{success, message}`
//! - **Verification**: the OTP view asks whether its cookie is still good

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::token::ClaimSet;

// =============================================================================
// Issuance Models
// =============================================================================

/// Request to issue a signup token.
///
/// The signup frontend sends `userId`; `subjectIdentifier` is accepted too.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IssuanceRequest {
    /// Identifier of the user who just signed up.
    #[serde(default, rename = "userId", alias = "subjectIdentifier")]
    pub user_id: Option<String>,
}

/// Outcome of an issuance request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IssuanceResponse {
    pub success: bool,
    pub message: String,
}

impl IssuanceResponse {
    pub fn created() -> Self {
        Self {
            success: true,
            message: "Token created successfully".to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// =============================================================================
// Verification Models
// =============================================================================

/// Claims of a valid signup token, returned to the guarded view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct VerificationResponse {
    /// Subject the token was issued for.
    pub subject: String,
    /// Issued at (Unix seconds).
    pub issued_at: i64,
    /// Expiration (Unix seconds).
    pub expires_at: i64,
    /// Seconds until the token expires.
    pub remaining_secs: i64,
}

impl VerificationResponse {
    pub fn from_claims(claims: ClaimSet, now: i64) -> Self {
        Self {
            remaining_secs: claims.remaining_secs(now),
            subject: claims.subject,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}

/// What the client should do after a refused verification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenyAction {
    /// No token at all: go through signup
    Signup,
    /// Token expired: request a new code
    Resend,
    /// Token tampered or garbled: access denied
    Deny,
}

/// Body of a refused verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DenyResponse {
    pub success: bool,
    pub message: String,
    pub error_code: String,
    pub action: DenyAction,
}
