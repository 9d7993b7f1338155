//! Lazily-populated directory tree.
//!
//! [`fs::controller::TreeController`] is the entry point: it loads a root,
//! expands directories on demand, and refreshes while keeping expanded
//! directories expanded. Consumers read [`fs::store::TreeSnapshot`]s and get
//! notified of commits through a `watch` receiver.

pub mod config;
pub mod error;
pub mod fs;
pub mod logging;
