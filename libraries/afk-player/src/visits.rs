//! Visit counter badge
//!
//! The site shows a unique-visitor count fetched from the visit server. The
//! player only renders the number; any failure leaves the last value in place.

use crate::error::VisitError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JSON body returned by the visit endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VisitResponse {
    pub fn counted(count: u64) -> Self {
        Self {
            ok: true,
            count: Some(count),
            error: None,
        }
    }

    /// Failed update that still reports the stored count
    pub fn degraded(count: u64, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            count: Some(count),
            error: Some(error.into()),
        }
    }

    /// The count, if the server sent one
    ///
    /// A degraded reply (`ok: false`) still carries the last known count.
    pub fn into_count(self) -> Result<u64, VisitError> {
        match (self.count, self.error) {
            (Some(count), _) => Ok(count),
            (None, Some(error)) => Err(VisitError::Decode(error)),
            (None, None) => Err(VisitError::Decode("missing count".to_string())),
        }
    }
}

/// The visit-count collaborator
#[async_trait(?Send)]
pub trait VisitCounter {
    /// Register this visitor (idempotent per visitor) and return the count
    async fn register(&self) -> Result<u64, VisitError>;
}

/// Last known visit count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitBadge {
    count: Option<u64>,
}

impl VisitBadge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// Take a collaborator result; errors mean "no update"
    pub fn apply(&mut self, result: Result<u64, VisitError>) -> Option<u64> {
        match result {
            Ok(count) => self.count = Some(count),
            Err(e) => debug!("Visit count unchanged: {}", e),
        }
        self.count
    }

    /// Register this visit and update the badge
    pub async fn refresh(&mut self, counter: &dyn VisitCounter) -> Option<u64> {
        let result = counter.register().await;
        self.apply(result)
    }

    /// Count with thousands separators, e.g. `12,345`
    pub fn label(&self) -> Option<String> {
        self.count.map(group_thousands)
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
