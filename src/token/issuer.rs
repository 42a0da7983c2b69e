// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup token issuance.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, Header};

use super::{ClaimSet, IssueError, SigningKey, TOKEN_ALGORITHM};

/// A freshly signed token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: ClaimSet,
}

/// Signs claim sets with the process signing key.
///
/// Pure: no cookies, no storage, no I/O.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: Arc<SigningKey>,
}

impl TokenIssuer {
    pub fn new(key: Arc<SigningKey>) -> Self {
        Self { key }
    }

    /// Issue a token for `subject` valid for the next ten minutes.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, IssueError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, subject: &str, now: i64) -> Result<IssuedToken, IssueError> {
        if subject.is_empty() {
            return Err(IssueError::Validation(
                "Subject must not be empty".to_string(),
            ));
        }

        let claims = ClaimSet::new(subject, now);
        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, self.key.encoding_key())
            .map_err(|e| IssueError::Configuration(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }
}
