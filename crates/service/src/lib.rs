//! Embedding layer for the podgate access engine.
//!
//! A protocol server links against this crate to:
//! - load its configuration from TOML
//! - install logging
//! - authorize each request through a [`Gatekeeper`]
//! - cache parsed authorization documents with a [`CachingParser`]

pub mod cache;
pub mod config;
pub mod gatekeeper;
pub mod logging;

// Re-export key types for convenience
pub use cache::{CacheStats, CachingParser};
pub use config::{Config, ConfigError};
pub use gatekeeper::{AccessRequest, Gatekeeper};
pub use logging::{init_logging, LoggingError};
