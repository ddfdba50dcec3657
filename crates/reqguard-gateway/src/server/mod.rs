//! Guarded Server
//!
//! Serves user routes over HTTP with every request running behind the
//! panic-safe wrapper.

mod handlers;

pub use handlers::HealthResponse;

use anyhow::Context;
use axum::{routing::get, Router};
use reqguard_core::Logger;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::safe_handler;

/// Env var for the bind host
pub const ENV_HOST: &str = "REQGUARD_HOST";
/// Env var for the bind port
pub const ENV_PORT: &str = "REQGUARD_PORT";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on (0 picks a free port)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Load from `REQGUARD_HOST` / `REQGUARD_PORT`, keeping defaults for
    /// anything missing or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup(ENV_HOST)
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup(ENV_PORT)
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Get the socket address
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid address {}:{}", self.host, self.port))
    }
}

/// HTTP server whose routes are all guarded
pub struct GuardServer {
    config: ServerConfig,
    logger: Arc<Logger>,
}

impl GuardServer {
    pub fn new(config: ServerConfig, logger: Arc<Logger>) -> Self {
        Self { config, logger }
    }

    pub fn logger(&self) -> Arc<Logger> {
        self.logger.clone()
    }

    /// Build the router: `/health` plus `routes`, all behind the wrapper
    pub fn router(&self, routes: Router) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .merge(routes);

        safe_handler::wrap(router, self.logger.clone()).layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until the process stops
    pub async fn run(self, routes: Router) -> anyhow::Result<()> {
        let addr = self.config.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        self.serve(listener, routes).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener, routes: Router) -> anyhow::Result<()> {
        let router = self.router(routes);

        let local_addr = listener.local_addr()?;
        info!("[Server] Listening on {}", local_addr);
        self.logger.positive(format!("listening on {}", local_addr));

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start serving in the background
    ///
    /// Returns a JoinHandle that can be used to wait for completion or abort.
    pub fn spawn(
        self,
        listener: TcpListener,
        routes: Router,
    ) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.serve(listener, routes).await })
    }
}
