use deployconfig_defaults::crd::scheme;
use deployconfig_defaults::server::{
    create_metrics, load_tls_config, run_server, run_server_tls, shutdown_channel,
    wait_for_signal, ReadinessState, ServerConfig, ServerState,
};
use deployconfig_defaults::storage::InMemoryStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

type ListenerHandle = JoinHandle<Result<(), std::io::Error>>;

/// Listener names and ports for the startup log
fn listeners(config: &ServerConfig) -> Vec<(&'static str, u16)> {
    let mut listeners = vec![("http", config.port)];
    if let Some(tls) = &config.tls {
        listeners.push(("https", tls.port));
    }
    listeners
}

/// Wait for a listener task, turning a panic or bind failure into an error
async fn join_listener(name: &'static str, handle: ListenerHandle) -> anyhow::Result<()> {
    match handle.await {
        Ok(Ok(())) => {
            info!(listener = name, "Listener stopped");
            Ok(())
        }
        Ok(Err(e)) => {
            error!(listener = name, error = %e, "Listener failed");
            Err(anyhow::anyhow!("{} listener failed: {}", name, e))
        }
        Err(e) => Err(anyhow::anyhow!("{} listener task aborted: {}", name, e)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting DeploymentConfig API server");

    let config = ServerConfig::from_env()?;
    info!(listeners = ?listeners(&config), "Configuration loaded");

    scheme::install();

    let metrics = create_metrics()?;
    info!("Prometheus metrics registry initialized");

    let tls_config = match &config.tls {
        Some(settings) => Some(load_tls_config(settings).inspect_err(|e| {
            error!(error = %e, "Failed to load TLS certificate");
        })?),
        None => {
            info!("TLS disabled - running HTTP only");
            None
        }
    };

    let (shutdown_controller, shutdown_signal) = shutdown_channel();
    let readiness = ReadinessState::new();
    let state = ServerState::new(Arc::new(InMemoryStore::new()), readiness.clone(), metrics);

    let mut http_handle: ListenerHandle = tokio::spawn(run_server(
        config.port,
        state.clone(),
        shutdown_signal.clone(),
    ));
    let https_handle: Option<ListenerHandle> = match (&config.tls, tls_config) {
        (Some(settings), Some(tls)) => Some(tokio::spawn(run_server_tls(
            settings.port,
            state,
            tls,
            shutdown_signal,
        ))),
        _ => None,
    };

    readiness.set_ready();
    info!("Server ready");

    tokio::select! {
        signal = wait_for_signal() => {
            let signal = signal?;
            info!(signal = signal, "Initiating graceful shutdown");
        }
        result = &mut http_handle => {
            // The HTTP listener only returns on its own if it failed
            readiness.set_not_ready();
            shutdown_controller.shutdown();
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(anyhow::anyhow!("http listener failed: {}", e)),
                Err(e) => Err(anyhow::anyhow!("http listener task aborted: {}", e)),
            };
        }
    }

    // Stop routing new traffic here before draining
    readiness.set_not_ready();
    shutdown_controller.shutdown();

    info!("Stopping listeners...");
    let http_result = join_listener("http", http_handle).await;
    let https_result = match https_handle {
        Some(handle) => join_listener("https", handle).await,
        None => Ok(()),
    };
    http_result?;
    https_result?;

    info!("DeploymentConfig API server shut down gracefully");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
