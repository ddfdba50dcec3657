//! Request wrapper integration tests
//!
//! Drives a guarded server over real HTTP.

mod concurrency;
