// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim set carried inside a signup token.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifetime of every issued token, in seconds (10 minutes).
///
/// The cookie `Max-Age` is derived from the claims, so changing this
/// changes both.
pub const TOKEN_TTL_SECS: i64 = 600;

/// Claims embedded in a signup token.
///
/// Serialized with the registered JWT claim names (`sub`, `iat`, `exp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClaimSet {
    /// Opaque subject identifier supplied by the signup flow
    #[serde(rename = "sub")]
    pub subject: String,

    /// Issued at (Unix seconds)
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiration (Unix seconds), always `issued_at + TOKEN_TTL_SECS`
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl ClaimSet {
    /// Build the claims for a token issued at `now`.
    pub fn new(subject: impl Into<String>, now: i64) -> Self {
        Self {
            subject: subject.into(),
            issued_at: now,
            expires_at: now + TOKEN_TTL_SECS,
        }
    }

    /// Seconds of validity left at `now`, never negative.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}
