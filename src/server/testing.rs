//! Helpers for tests that talk to a live listener

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::{create_metrics, serve, shutdown_channel, ReadinessState, ServerState, ShutdownController};
use crate::storage::InMemoryStore;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: ServerState,
    pub client: reqwest::Client,
    shutdown: ShutdownController,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    /// Bind an ephemeral port and serve a fresh in-memory store on it
    pub async fn start() -> Self {
        let state = ServerState::new(
            Arc::new(InMemoryStore::new()),
            ReadinessState::new(),
            create_metrics().unwrap(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, signal) = shutdown_channel();
        let handle = tokio::spawn(serve(listener, state.clone(), signal));

        Self {
            addr,
            state,
            client: reqwest::Client::new(),
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger graceful shutdown and wait for the listener to exit
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.shutdown();
        self.handle.await.unwrap()
    }
}
