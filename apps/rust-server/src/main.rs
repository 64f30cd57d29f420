// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crowdfund_rust_server::{
    api::router,
    blockchain::{LedgerClient, XrplClient},
    config::{Config, LogFormat, StoreBackend, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{JsonFileStore, ParticipantStore, RedbStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn ParticipantStore>, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.data_dir)?;
    let store: Arc<dyn ParticipantStore> = match config.store_backend {
        StoreBackend::Json => Arc::new(JsonFileStore::new(&config.data_dir)),
        StoreBackend::Redb => Arc::new(RedbStore::open(&config.data_dir)?),
    };
    Ok(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            tracing::error!(variable = e.variable, error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    init_tracing(config.log_format);

    let ledger: Arc<dyn LedgerClient> = Arc::new(XrplClient::new(
        config.network.clone(),
        config.confirmation,
    )?);
    let store = open_store(&config)?;

    tracing::info!(
        network = %config.network.name,
        rpc_url = %config.network.rpc_url,
        store = store.backend(),
        data_dir = %config.data_dir.display(),
        failure_policy = config.workflow.failure_policy.as_str(),
        "Starting crowdfund server"
    );

    let state = AppState::new(ledger, store, config.network.clone(), config.workflow.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
