//! Reqguard server
//!
//! Small service whose routes all run behind the panic-safe wrapper.
//! Configuration comes from the environment (see `LoggingConfig` and
//! `ServerConfig`).

mod routes;

use reqguard_core::{telemetry, Logger, LoggingConfig};
use reqguard_gateway::{GuardServer, ServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging = LoggingConfig::from_env();
    // Guard must be kept alive for the duration of the program
    let _guard = telemetry::init_tracing(&logging)?;

    let logger = Logger::stdout();
    logger.set_debug_enabled(logging.debug);
    if let Some(path) = &logging.log_file {
        // Exits the process when the file cannot be opened
        logger.write_logs_to_file(path);
        info!("Channels redirected to {}", path.display());
    }
    let logger = Arc::new(logger);

    let server = GuardServer::new(ServerConfig::from_env(), logger.clone());
    server.run(routes::routes(logger)).await
}
