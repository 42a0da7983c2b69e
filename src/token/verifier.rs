// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup token verification.
//!
//! Verification runs in three passes so each failure has one meaning:
//!
//! 1. Structure: header and payload must decode and carry `sub`, `iat`
//!    and `exp`. Anything else is [`VerifyError::Malformed`].
//! 2. Signature: recomputed against the signing key under the one accepted
//!    algorithm. A wrong key, a foreign algorithm or a corrupted signature
//!    segment is [`VerifyError::InvalidSignature`].
//! 3. Expiry: `exp` must lie strictly after `now`, with no leeway.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, errors::ErrorKind, Validation};

use super::{ClaimSet, SigningKey, VerifyError, TOKEN_ALGORITHM};

/// Checks signup tokens against the process signing key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: Arc<SigningKey>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(key: Arc<SigningKey>) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self { key, validation }
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<ClaimSet, VerifyError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify `token` as if the current time were `now` (Unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<ClaimSet, VerifyError> {
        let unverified = jsonwebtoken::dangerous::insecure_decode::<ClaimSet>(token)
            .map_err(|_| VerifyError::Malformed)?;
        if unverified.claims.subject.is_empty() {
            return Err(VerifyError::Malformed);
        }

        let claims = decode::<ClaimSet>(token, self.key.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
                    VerifyError::InvalidSignature
                }
                _ => VerifyError::Malformed,
            })?
            .claims;

        if claims.is_expired_at(now) {
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }
}
