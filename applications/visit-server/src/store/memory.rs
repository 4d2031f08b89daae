use super::VisitStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Visits {
    visitors: HashSet<String>,
    count: u64,
}

/// Process-local store for development and tests
#[derive(Debug, Default)]
pub struct MemoryVisitStore {
    inner: RwLock<Visits>,
}

impl MemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VisitStore for MemoryVisitStore {
    async fn count(&self) -> Result<u64> {
        Ok(self.inner.read().await.count)
    }

    async fn is_known(&self, visitor: &str) -> Result<bool> {
        Ok(self.inner.read().await.visitors.contains(visitor))
    }

    async fn record(&self, visitor: &str) -> Result<u64> {
        let mut visits = self.inner.write().await;
        // Two racing first requests from one visitor still count once
        if visits.visitors.insert(visitor.to_string()) {
            visits.count += 1;
        }
        Ok(visits.count)
    }
}
