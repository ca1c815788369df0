//! HTTP(S) front end for the DeploymentConfig API
//!
//! One router serves both API surfaces, the mutating admission webhook and
//! the Kubernetes probes:
//! - `/oapi/{version}/namespaces/{namespace}/deploymentconfigs[/{name}]`
//! - `/apis/{group}/{version}/namespaces/{namespace}/deploymentconfigs[/{name}]`
//! - `/mutate` - AdmissionReview defaulting webhook
//! - `/healthz`, `/readyz`, `/metrics`
//!
//! Listeners stop accepting connections when the [`ShutdownSignal`] fires.

mod api;
pub mod config;
mod error;
mod health;
pub mod metrics;
pub mod shutdown;
pub mod tls;
mod webhook;

pub use config::{ConfigError, ServerConfig, TlsSettings};
pub use error::{ApiError, Status};
pub use health::ReadinessState;
pub use metrics::{create_metrics, Metrics, SharedMetrics};
pub use shutdown::{shutdown_channel, wait_for_signal, ShutdownController, ShutdownSignal};
pub use tls::{load_tls_config, TlsError};

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::crd::scheme::{self, Scheme};
use crate::storage::ObjectStore;

/// How long the HTTPS listener waits for in-flight requests on shutdown
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// State shared by every handler
#[derive(Clone)]
pub struct ServerState {
    readiness: ReadinessState,
    metrics: SharedMetrics,
    store: Arc<dyn ObjectStore>,
    scheme: &'static Scheme,
}

impl ServerState {
    /// Create new server state, installing the scheme if needed
    pub fn new(
        store: Arc<dyn ObjectStore>,
        readiness: ReadinessState,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            readiness,
            metrics,
            store,
            scheme: scheme::install(),
        }
    }

    pub fn readiness(&self) -> &ReadinessState {
        &self.readiness
    }
}

/// Build the router for the API, webhook and probe endpoints
pub fn build_router(state: ServerState) -> Router {
    let legacy_collection = "/oapi/{version}/namespaces/{namespace}/deploymentconfigs";
    let legacy_object = "/oapi/{version}/namespaces/{namespace}/deploymentconfigs/{name}";
    let group_collection = "/apis/{group}/{version}/namespaces/{namespace}/deploymentconfigs";
    let group_object = "/apis/{group}/{version}/namespaces/{namespace}/deploymentconfigs/{name}";

    Router::new()
        .route(legacy_collection, get(api::list).post(api::create))
        .route(
            legacy_object,
            get(api::get).put(api::update).delete(api::delete),
        )
        .route(group_collection, get(api::list).post(api::create))
        .route(
            group_object,
            get(api::get).put(api::update).delete(api::delete),
        )
        .route("/mutate", post(webhook::mutate))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .with_state(state)
}

/// Serve plain HTTP on an already-bound listener until `shutdown` fires
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}

/// Run the HTTP listener on `port`
pub async fn run_server(
    port: u16,
    state: ServerState,
    shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    // Log after bind so the message means the port is actually open
    info!(port = %port, "DeploymentConfig API listening (HTTP)");

    serve(listener, state, shutdown).await
}

/// Run the HTTPS listener on `port`
///
/// Serves the same routes as [`run_server`]. The admission webhook is only
/// reachable by the cluster API server over TLS, so this is the listener
/// `/mutate` is registered against.
pub async fn run_server_tls(
    port: u16,
    state: ServerState,
    tls_config: Arc<rustls::ServerConfig>,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    use axum_server::tls_rustls::RustlsConfig;
    use axum_server::Handle;

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let config = RustlsConfig::from_config(tls_config);

    let handle = Handle::new();
    let drain = handle.clone();
    tokio::spawn(async move {
        shutdown.wait().await;
        drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
    });

    info!(port = %port, "DeploymentConfig API and admission webhook listening (HTTPS)");

    axum_server::bind_rustls(addr, config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
}

#[cfg(test)]
mod testing;

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;

#[cfg(test)]
#[path = "tls_test.rs"]
mod tls_tests;
