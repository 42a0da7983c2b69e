// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cookie transport for signup tokens.
//!
//! Pure transport: nothing here inspects or validates the token itself.
//!
//! The envelope is fixed: `token=<jwt>; Path=/; Max-Age=<remaining>;
//! HttpOnly; SameSite=Lax` plus `Secure` in production. `Max-Age` is
//! derived from the claims so it always matches the token's validity.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use crate::token::IssuedToken;

/// Name of the cookie carrying the signup token.
pub const TOKEN_COOKIE_NAME: &str = "token";

/// Environment-dependent cookie attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CookiePolicy {
    /// Emit the `Secure` attribute (production only)
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }
}

/// Attributes of a `Set-Cookie` header for the token cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEnvelope<'a> {
    pub value: &'a str,
    pub max_age: i64,
    pub secure: bool,
}

impl CookieEnvelope<'_> {
    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{TOKEN_COOKIE_NAME}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.value, self.max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Build the envelope for `issued` as seen at `now`.
pub fn envelope_for<'a>(issued: &'a IssuedToken, policy: CookiePolicy, now: i64) -> CookieEnvelope<'a> {
    CookieEnvelope {
        value: &issued.token,
        max_age: issued.claims.remaining_secs(now),
        secure: policy.secure,
    }
}

/// Append the token cookie to outgoing response headers.
pub fn attach(
    headers: &mut HeaderMap,
    issued: &IssuedToken,
    policy: CookiePolicy,
    now: i64,
) -> Result<(), InvalidHeaderValue> {
    let value = envelope_for(issued, policy, now).to_header_value()?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

/// Append a cookie that makes the browser drop the token immediately.
pub fn clear(headers: &mut HeaderMap, policy: CookiePolicy) -> Result<(), InvalidHeaderValue> {
    let value = CookieEnvelope {
        value: "",
        max_age: 0,
        secure: policy.secure,
    }
    .to_header_value()?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

/// Read the token cookie from incoming request headers.
///
/// Looks through every `Cookie` header. Empty values count as absent.
pub fn extract(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == TOKEN_COOKIE_NAME)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
