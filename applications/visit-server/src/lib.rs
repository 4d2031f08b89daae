//! AFK Visit Server Library
//!
//! Unique-visitor counter behind the AFK site's `/api/visits` endpoint, backed
//! by Upstash Redis (or memory for local development).
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod store;

// Re-export commonly used types for convenience
pub use config::{ServerConfig, StoreBackend};
pub use error::{Result, ServerError};
pub use state::AppState;
pub use store::{hash_client_token, register_visit, MemoryVisitStore, UpstashVisitStore, VisitStore};
