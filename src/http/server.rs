//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the relay endpoint and health check
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Serve on a listener until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GuardConfig;
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::json_error_bodies;
use crate::relay::handlers::{self, RelayState};

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: GuardConfig,
}

impl HttpServer {
    pub fn new(config: GuardConfig, state: RelayState) -> Self {
        let router = Self::build_router(&config, Arc::new(state));
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GuardConfig, state: Arc<RelayState>) -> Router {
        let endpoint = post(handlers::contact)
            .options(handlers::preflight)
            .fallback(handlers::method_not_allowed);

        let router = Router::new()
            .route(&config.relay.path, endpoint)
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        Duration::from_secs(config.timeouts.request_secs),
                    )),
            )
            .layer(middleware::map_response(json_error_bodies));

        if config.security.cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.relay.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The fully layered router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }
}
