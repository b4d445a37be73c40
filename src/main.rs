// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc};

use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use personalnote_server::{
    api::router,
    auth::TokenCodec,
    config::{AppConfig, LogFormat, StorageBackend},
    cors::OriginPolicy,
    providers::{DriveClient, GoogleOAuthClient},
    state::AppState,
    storage::{MemoryStore, MySqlStore},
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            error!(error = %e, "Invalid configuration");
            process::exit(1);
        }
    };
    init_tracing(config.log_format);

    if let Err(message) = run(config).await {
        error!(error = %message, "Server stopped with an error");
        process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), String> {
    let tokens = TokenCodec::new(&config.jwt_secret);

    let mut state = match config.storage {
        StorageBackend::MySql => {
            let store = MySqlStore::connect(&config.database)
                .await
                .map_err(|e| format!("database connection failed: {e}"))?;
            AppState::new(Arc::new(store), tokens)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            AppState::new(Arc::new(MemoryStore::new()), tokens)
        }
    };

    state = state
        .with_origin_policy(OriginPolicy::from_list(config.cors_allowed_origins.clone()))
        .with_frontend_url(config.frontend_url.clone());

    match &config.google {
        Some(google) => {
            let client = GoogleOAuthClient::new(google)
                .map_err(|e| format!("failed to build OAuth client: {e}"))?;
            state = state.with_identity(Arc::new(client));
            info!(redirect_url = %google.redirect_url, "Google sign-in enabled");
        }
        None => warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set; sign-in disabled"),
    }

    match &config.drive {
        Some(drive) => {
            let client =
                DriveClient::new(drive).map_err(|e| format!("failed to build Drive client: {e}"))?;
            state = state.with_blobs(Arc::new(client), drive.folder_id.clone());
            info!(folder_id = ?drive.folder_id, "Google Drive uploads enabled");
        }
        None => warn!(
            folder_id = ?config.drive_folder_id,
            "No Drive credentials configured; uploads disabled"
        ),
    }

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;
    info!(%addr, "Personalnote server listening (docs at /docs)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
