// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process startup: open storage, build state, serve HTTP or HTTPS.

use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};

use crate::{
    api::router,
    auth::{AuthError, PasswordHasher, TokenService},
    config::Config,
    state::AppState,
    storage::{Database, StorageError},
};

/// Time in-flight requests get to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to open database: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to set up password hashing: {0}")]
    Auth(#[from] AuthError),

    #[error("failed to load TLS certificate/key: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the application from `config` and serve until Ctrl-C.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let db = Database::open(&config.database_path())?;
    let tokens = TokenService::new(&config.tokens);
    let passwords = PasswordHasher::new(config.bcrypt_cost)?;
    let app = router(AppState::new(db, tokens, passwords));

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received, draining connections");
                shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            // Fails only if a provider is already installed
            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .map_err(ServerError::Tls)?;

            tracing::info!(%addr, scheme = "https", "Prescriptions API listening (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, scheme = "http", "Prescriptions API listening (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
