// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup Token Gate - short-lived signed tokens for the OTP step
//!
//! After signup the server issues a ten-minute HMAC-signed token in an
//! HttpOnly cookie. The OTP confirmation view only renders for requests
//! whose cookie still verifies.
//!
//! ## Modules
//!
//! - `token` - Claim set, signing key, issuer and verifier
//! - `cookie` - `Set-Cookie` / `Cookie` transport for the token
//! - `gate` - Issuance boundary and the protected-view extractor
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Startup configuration and signing secret loading

pub mod api;
pub mod config;
pub mod cookie;
pub mod error;
pub mod gate;
pub mod models;
pub mod state;
pub mod telemetry;
pub mod token;
