//! Leveled logging integration tests
//!
//! File redirection, channel gating and failure rendering through the
//! public API.

mod failure_logging;
