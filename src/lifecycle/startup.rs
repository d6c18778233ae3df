//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging and metrics from the loaded configuration
//! - Read the relay secrets once; a missing secret is reported here only
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Missing secrets do not abort startup; every POST answers 500 instead
//! - Listener binds last, after every subsystem is ready

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GuardConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_shutdown_signal;
use crate::observability::{logging, metrics};
use crate::relay::handlers::RelayState;
use crate::relay::secrets::RelayConfig;
use crate::relay::transport::DeliveryError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build messaging client: {0}")]
    Transport(#[from] DeliveryError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the relay with `config` until SIGINT/SIGTERM.
pub async fn run(config: GuardConfig) -> Result<(), StartupError> {
    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        path = %config.relay.path,
        request_timeout_secs = config.timeouts.request_secs,
        "contact-guard relay starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let secrets = RelayConfig::from_env();
    if let Err(e) = &secrets {
        tracing::error!(error = %e, "Relay credentials not configured; every submission will fail");
    }
    let state = RelayState::from_secrets(&config, secrets)?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state);
    let mut serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let finished_early = tokio::select! {
        joined = &mut serving => Some(joined),
        _ = wait_for_shutdown_signal() => None,
    };
    let joined = match finished_early {
        Some(joined) => joined,
        None => {
            shutdown.trigger();
            serving.await
        }
    };

    match joined {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "Server task ended abnormally"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
