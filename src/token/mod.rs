// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signup Token Module
//!
//! Short-lived HMAC-signed tokens proving the holder just completed signup.
//!
//! ## Token Flow
//!
//! 1. Signup succeeds and the frontend posts the new user ID
//! 2. [`TokenIssuer`] signs `{sub, iat, exp = iat + 600}` with HS256
//! 3. The token travels to the browser in an HttpOnly `token` cookie
//! 4. The OTP view presents the cookie and [`TokenVerifier`] either returns
//!    the claims or reports why it refused
//!
//! ## Security
//!
//! - One process-wide [`SigningKey`], loaded before serving, never mutated
//! - Only HS256 is accepted; tokens declaring anything else are rejected
//! - No server-side token store: tokens die by expiry alone

pub mod claims;
pub mod error;
pub mod issuer;
pub mod key;
pub mod verifier;

use jsonwebtoken::Algorithm;

pub use claims::{ClaimSet, TOKEN_TTL_SECS};
pub use error::{IssueError, VerifyError};
pub use issuer::{IssuedToken, TokenIssuer};
pub use key::{EmptySecretError, SigningKey};
pub use verifier::TokenVerifier;

/// The only signing algorithm issued or accepted.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;
