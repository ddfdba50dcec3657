//! `tracing` bootstrap for the library's own diagnostics
//!
//! The four product channels write straight to their sink. Everything the
//! library reports about itself (sink redirection, dropped lines, request
//! spans, response encoding problems) goes through `tracing` instead.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::LoggingConfig;

/// Default directives when neither `RUST_LOG` nor the config sets a filter
const DEFAULT_FILTER: &str = "info,reqguard_core=debug,reqguard_gateway=debug";

/// Build the filter: config first, then `RUST_LOG`, then the defaults
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    config
        .filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing diagnostics to stderr.
///
/// The returned guard must be kept alive for the duration of the program so
/// buffered diagnostics get flushed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    // Console layer: colored, compact
    let console_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(console_layer)
        .try_init()?;

    Ok(guard)
}
