// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info, warn};

use signup_token_gate::{
    api::router,
    config::{load_signing_key, AppConfig, LogFormat},
    cookie::CookiePolicy,
    state::AppState,
    telemetry::init_tracing,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(LogFormat::from_env());

    // The signing key must be in place before any traffic is served.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    let key = match load_signing_key(&config.secret_source).await {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "Signing key unavailable, refusing to start");
            return ExitCode::FAILURE;
        }
    };
    info!(fingerprint = key.fingerprint(), "Signing key loaded");

    let cookie_policy = CookiePolicy::new(config.environment.is_production());
    if !cookie_policy.secure {
        warn!("Non-production environment: token cookies are sent without the Secure attribute");
    }

    let app = router(AppState::new(key, cookie_policy));

    let addr: SocketAddr = match config.bind_address().parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, address = %config.bind_address(), "Failed to parse bind address");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let served = match &config.tls {
        Some(tls) => {
            if rustls::crypto::ring::default_provider().install_default().is_err() {
                warn!("rustls crypto provider was already installed");
            }
            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(error = %e, "Failed to load TLS certificate or key");
                    return ExitCode::FAILURE;
                }
            };

            info!(%addr, "Signup token gate listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(%addr, "Signup token gate listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    match served {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn wait_for_shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
