//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use contact_guard::config::GuardConfig;
use contact_guard::guard::ContactForm;
use contact_guard::http::HttpServer;
use contact_guard::lifecycle::Shutdown;
use contact_guard::relay::{RelayConfig, RelayState, SecretsError};

pub const TEST_TOKEN: &str = "TEST-TOKEN";
pub const TEST_CHAT: &str = "chat-1";

/// One call received by the mock messaging API.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
struct MockApiState {
    deliveries: Mutex<Vec<Delivery>>,
    refuse: AtomicBool,
}

/// A stand-in for the external messaging API, listening on an ephemeral port.
pub struct MockApi {
    pub addr: SocketAddr,
    state: Arc<MockApiState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockApiState::default());
        let app = Router::new()
            .route("/{*path}", post(send_message))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every following call with `ok:false`.
    pub fn refuse(&self) {
        self.state.refuse.store(true, Ordering::SeqCst);
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.state.deliveries.lock().unwrap().clone()
    }
}

async fn send_message(
    State(state): State<Arc<MockApiState>>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.deliveries.lock().unwrap().push(Delivery {
        path: format!("/{path}"),
        body,
    });

    if state.refuse.load(Ordering::SeqCst) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "description": "Bad Request: chat not found"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"ok": true, "result": {"message_id": 1}})))
    }
}

/// A relay stand-in that answers every request with `status` and `body`.
/// Returns its URL.
pub async fn spawn_canned_relay(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/api/contact",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}/api/contact")
}

/// A relay server running in the background.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub config: GuardConfig,
    shutdown: Shutdown,
}

impl RunningRelay {
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, self.config.relay.path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for RunningRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Relay configuration pointing at `api`.
pub fn relay_config(api: &MockApi) -> GuardConfig {
    let mut config = GuardConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.relay.api_base_url = api.base_url();
    config.relay.upstream_timeout_secs = 5;
    config
}

pub fn test_secrets() -> Result<RelayConfig, SecretsError> {
    Ok(RelayConfig::new(TEST_TOKEN, TEST_CHAT))
}

/// Bind on an ephemeral port and serve the relay until the handle is dropped.
pub async fn spawn_relay(
    config: GuardConfig,
    secrets: Result<RelayConfig, SecretsError>,
) -> RunningRelay {
    let state = RelayState::from_secrets(&config, secrets).unwrap();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.clone(), state);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningRelay {
        addr,
        config,
        shutdown,
    }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn valid_form() -> ContactForm {
    ContactForm {
        name: "Tom & Jerry".into(),
        email: "tom@example.org".into(),
        phone: Some("+44 20 7946 0958".into()),
        service: "corporate".into(),
        message: "We need a corporate website with a blog section.".into(),
        ..Default::default()
    }
}
