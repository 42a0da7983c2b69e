// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signup Gate
//!
//! Ties the token primitives to HTTP.
//!
//! - [`issuance`] turns a subject identifier into a `Set-Cookie` header
//! - [`extractor`] turns a `Cookie` header back into verified claims, or a
//!   rejection that tells expired tokens apart from hostile ones

pub mod extractor;
pub mod issuance;

pub use extractor::{verify_request_at, GateRejection, SignupToken};
pub use issuance::{handle, handle_at, Issued, MISSING_SUBJECT_MESSAGE};
