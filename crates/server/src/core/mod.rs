//! Core Service Layer
//!
//! Shared infrastructure for the Streamify server: configuration, the
//! database handle, authentication, data models and error mapping.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod router;

// Re-exports for convenience
pub use config::{AppState, ServerConfig};
pub use ctx::Ctx;
pub use db::Db;
pub use error::{Error, Result};
pub use extract::ApiJson;
pub use router::router;
