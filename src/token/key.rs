// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide HMAC signing key.
//!
//! ## Security
//!
//! - Built once at startup and shared read-only behind an `Arc`
//! - An empty secret cannot be turned into a key
//! - `Debug` output is redacted; only a SHA-256 fingerprint may be logged

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey};
use sha2::{Digest, Sha256};

/// Secrets shorter than this are accepted but reported as weak.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Returned when a key is built from an empty secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Signing secret is empty")]
pub struct EmptySecretError;

/// Immutable HMAC secret with pre-built jsonwebtoken keys.
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    fingerprint: String,
    len: usize,
}

impl SigningKey {
    /// Build a key from raw secret bytes.
    ///
    /// Surrounding whitespace is not significant, so a secret read from a
    /// file with a trailing newline signs the same as the inline value.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, EmptySecretError> {
        let secret = secret.as_ref().trim_ascii();
        if secret.is_empty() {
            return Err(EmptySecretError);
        }

        let digest = Sha256::digest(secret);
        let fingerprint = digest[..8].iter().map(|b| format!("{b:02x}")).collect();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            fingerprint,
            len: secret.len(),
        })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Short hex fingerprint, safe to log.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn is_weak(&self) -> bool {
        self.len < RECOMMENDED_SECRET_LEN
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("fingerprint", &self.fingerprint)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
