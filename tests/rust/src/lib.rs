//! Shared test utilities and fixtures for Reqguard integration tests.

pub use reqguard_core::{Logger, MemoryBuffer, Sink};

/// Guarded server harness
pub mod services;
pub use services::GuardedServerHarness;

/// Log inspection helpers
pub mod logs {
    use reqguard_core::{LogChannel, MemoryBuffer};

    /// Lines written to `channel`, with prefix and timestamp stripped
    pub fn channel_lines(buffer: &MemoryBuffer, channel: LogChannel) -> Vec<String> {
        buffer
            .lines()
            .iter()
            .filter_map(|line| line.strip_prefix(channel.prefix()))
            // "YYYY/MM/DD HH:MM:SS " is 20 bytes
            .filter_map(|rest| rest.get(20..))
            .map(String::from)
            .collect()
    }

    /// Install a test subscriber once so library diagnostics show up with
    /// `--nocapture`
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("reqguard_gateway=debug,reqguard_core=debug")
            .with_test_writer()
            .try_init();
    }
}
