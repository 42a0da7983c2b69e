// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::{
    cookie::CookiePolicy,
    token::{SigningKey, TokenIssuer, TokenVerifier},
};

/// Counts issued tokens that failed their own verification.
///
/// Any non-zero value means issuer and verifier disagree.
#[derive(Debug, Default)]
pub struct SelfCheckMonitor {
    anomalies: AtomicU64,
}

impl SelfCheckMonitor {
    pub fn record_anomaly(&self) -> u64 {
        self.anomalies.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn anomalies(&self) -> u64 {
        self.anomalies.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
    pub cookie_policy: CookiePolicy,
    pub self_check: Arc<SelfCheckMonitor>,
    pub key_fingerprint: Arc<str>,
}

impl AppState {
    pub fn new(key: SigningKey, cookie_policy: CookiePolicy) -> Self {
        let key = Arc::new(key);
        Self {
            issuer: TokenIssuer::new(key.clone()),
            verifier: TokenVerifier::new(key.clone()),
            cookie_policy,
            self_check: Arc::new(SelfCheckMonitor::default()),
            key_fingerprint: key.fingerprint().into(),
        }
    }

    /// Replace the verifier, e.g. with one bound to a different key.
    #[cfg(test)]
    pub(crate) fn with_verifier(mut self, verifier: TokenVerifier) -> Self {
        self.verifier = verifier;
        self
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    AppState::new(
        SigningKey::from_secret("state-test-secret-0123456789abcdef").unwrap(),
        CookiePolicy::default(),
    )
}
