//! Test server builders and helpers
//!
//! Spawns a guarded server on an ephemeral port with an in-memory sink so
//! tests can drive it over real HTTP and inspect what was logged.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqguard_core::{Logger, MemoryBuffer, Sink};
use reqguard_gateway::{GuardServer, ServerConfig};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Running guarded server plus the buffer its channels write to
pub struct GuardedServerHarness {
    /// Address the server listens on
    pub addr: SocketAddr,

    /// Logger shared with the server
    pub logger: Arc<Logger>,

    /// Everything the four channels wrote
    pub buffer: MemoryBuffer,

    /// HTTP client for requests against the server
    pub client: reqwest::Client,

    handle: JoinHandle<anyhow::Result<()>>,
}

impl GuardedServerHarness {
    /// Spawn a server serving `routes` behind the wrapper
    pub async fn spawn(routes: Router) -> Self {
        let (sink, buffer) = Sink::memory();
        let logger = Arc::new(Logger::new(sink));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = ServerConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
        };
        let handle = GuardServer::new(config, logger.clone()).spawn(listener, routes);

        Self {
            addr,
            logger,
            buffer,
            client: reqwest::Client::new(),
            handle,
        }
    }

    /// Absolute URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for GuardedServerHarness {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
