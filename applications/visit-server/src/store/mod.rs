//! Visit storage
//!
//! A visitor is a SHA-256 hash of the client address; raw addresses never
//! reach the store.

mod memory;
mod upstash;

pub use memory::MemoryVisitStore;
pub use upstash::UpstashVisitStore;

use crate::error::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Backend holding the visitor set and the unique-visit counter
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Current count (0 if never written)
    async fn count(&self) -> Result<u64>;

    /// Whether `visitor` was seen before
    async fn is_known(&self, visitor: &str) -> Result<bool>;

    /// Add `visitor` and return the count
    ///
    /// The counter moves only if this call is the one that added the
    /// visitor, so concurrent first visits from one client count once.
    async fn record(&self, visitor: &str) -> Result<u64>;
}

/// Hex SHA-256 of a client token
pub fn hash_client_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Count a visit from `client_token` once and return the resulting count
///
/// An empty token cannot be attributed to anyone and only reads the count.
pub async fn register_visit(store: &dyn VisitStore, client_token: &str) -> Result<u64> {
    let token = client_token.trim();
    if token.is_empty() {
        debug!("No client address, reading count only");
        return store.count().await;
    }

    let visitor = hash_client_token(token);
    if store.is_known(&visitor).await? {
        store.count().await
    } else {
        store.record(&visitor).await
    }
}
