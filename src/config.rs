// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once, at startup.
//! A missing or empty signing secret aborts startup; it is never a
//! per-request failure.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TOKEN_SECRET` | Signing secret, inline | One secret source required |
//! | `TOKEN_SECRET_FILE` | Path to a file holding the signing secret | |
//! | `TOKEN_SECRET_URL` | HTTPS endpoint returning the secret as text | |
//! | `APP_ENV` | `production` enables `Secure` cookies | `development` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (HTTPS when set with key) | Optional |
//! | `TLS_KEY_PATH` | PEM private key | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, path::PathBuf, time::Duration};

use url::Url;

use crate::token::SigningKey;

pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";
pub const TOKEN_SECRET_FILE_ENV: &str = "TOKEN_SECRET_FILE";
pub const TOKEN_SECRET_URL_ENV: &str = "TOKEN_SECRET_URL";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Upper bound on the remote secret fetch; startup fails past this.
pub const SECRET_FETCH_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "No signing secret configured (set {inline}, {file} or {url})",
        inline = TOKEN_SECRET_ENV,
        file = TOKEN_SECRET_FILE_ENV,
        url = TOKEN_SECRET_URL_ENV
    )]
    MissingSecret,

    #[error("Signing secret from {0} is empty")]
    EmptySecret(&'static str),

    #[error("Failed to read signing secret file {path}: {source}")]
    SecretFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid signing secret URL: {0}")]
    SecretUrl(String),

    #[error("Signing secret fetch failed: {0}")]
    SecretFetch(String),

    #[error("Signing secret fetch timed out after {ms}ms", ms = SECRET_FETCH_TIMEOUT.as_millis())]
    SecretFetchTimeout,

    #[error("Invalid {env} value: {0}", env = PORT_ENV)]
    InvalidPort(String),

    #[error("{cert} and {key} must be set together", cert = TLS_CERT_PATH_ENV, key = TLS_KEY_PATH_ENV)]
    IncompleteTls,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "production" || v == "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT` alone, so logging can start before full config.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Where the signing secret comes from.
#[derive(Clone)]
pub enum SecretSource {
    Inline(String),
    File(PathBuf),
    Url(Url),
}

impl SecretSource {
    fn label(&self) -> &'static str {
        match self {
            SecretSource::Inline(_) => TOKEN_SECRET_ENV,
            SecretSource::File(_) => TOKEN_SECRET_FILE_ENV,
            SecretSource::Url(_) => TOKEN_SECRET_URL_ENV,
        }
    }
}

impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Inline(_) => f.write_str("Inline([REDACTED])"),
            SecretSource::File(path) => f.debug_tuple("File").field(path).finish(),
            SecretSource::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub secret_source: SecretSource,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret_source = if let Some(secret) = lookup(TOKEN_SECRET_ENV) {
            if secret.trim().is_empty() {
                return Err(ConfigError::EmptySecret(TOKEN_SECRET_ENV));
            }
            SecretSource::Inline(secret)
        } else if let Some(path) = var(TOKEN_SECRET_FILE_ENV) {
            SecretSource::File(PathBuf::from(path))
        } else if let Some(raw) = var(TOKEN_SECRET_URL_ENV) {
            SecretSource::Url(parse_secret_url(&raw)?)
        } else {
            return Err(ConfigError::MissingSecret);
        };

        let port = match var(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            host: var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            environment: Environment::parse(var(APP_ENV_ENV).as_deref()),
            secret_source,
            tls,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Only HTTPS, except plain HTTP to the local host.
fn parse_secret_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::SecretUrl(e.to_string()))?;
    let local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"));
    match url.scheme() {
        "https" => Ok(url),
        "http" if local => Ok(url),
        scheme => Err(ConfigError::SecretUrl(format!(
            "scheme '{scheme}' not allowed, use https"
        ))),
    }
}

/// Resolve the signing secret and build the process signing key.
///
/// The remote fetch is the only await point and is bounded by
/// [`SECRET_FETCH_TIMEOUT`].
pub async fn load_signing_key(source: &SecretSource) -> Result<SigningKey, ConfigError> {
    let secret = match source {
        SecretSource::Inline(secret) => secret.clone(),
        SecretSource::File(path) => {
            std::fs::read_to_string(path).map_err(|source| ConfigError::SecretFile {
                path: path.clone(),
                source,
            })?
        }
        SecretSource::Url(url) => {
            tokio::time::timeout(SECRET_FETCH_TIMEOUT, fetch_secret(url))
                .await
                .map_err(|_| ConfigError::SecretFetchTimeout)??
        }
    };

    let key = SigningKey::from_secret(&secret).map_err(|_| ConfigError::EmptySecret(source.label()))?;

    if key.is_weak() {
        tracing::warn!(
            source = source.label(),
            fingerprint = key.fingerprint(),
            "Signing secret is shorter than recommended"
        );
    }

    Ok(key)
}

async fn fetch_secret(url: &Url) -> Result<String, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(SECRET_FETCH_TIMEOUT)
        .build()
        .map_err(|e| ConfigError::SecretFetch(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ConfigError::SecretFetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ConfigError::SecretFetch(format!(
            "HTTP {} from secret endpoint",
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ConfigError::SecretFetch(e.to_string()))
}
