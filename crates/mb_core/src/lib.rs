//! MB Core - Media ingestion backend for Memory Book
//!
//! This crate contains all media handling logic with zero UI dependencies.
//! It can be used by a GUI front end or the `memory-book` CLI.

pub mod config;
pub mod encoding;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod probe;
pub mod recorder;
pub mod session;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
