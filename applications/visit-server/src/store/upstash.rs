//! Upstash Redis over its REST API
//!
//! Every call is a `POST` with a bearer token and a JSON body; replies carry
//! either `result` or `error`.

use super::VisitStore;
use crate::config::StoreSettings;
use crate::error::{Result, ServerError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub struct UpstashVisitStore {
    http: Client,
    base_url: String,
    token: String,
    count_key: String,
    visitors_key: String,
}

impl UpstashVisitStore {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        count_key: impl Into<String>,
        visitors_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("afk-visit-server/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            count_key: count_key.into(),
            visitors_key: visitors_key.into(),
        })
    }

    pub fn from_settings(settings: &StoreSettings) -> Result<Self> {
        let url = settings
            .upstash_url
            .clone()
            .ok_or_else(|| ServerError::Config("Upstash URL missing".to_string()))?;
        let token = settings
            .upstash_token
            .clone()
            .ok_or_else(|| ServerError::Config("Upstash token missing".to_string()))?;

        Self::new(
            url,
            token,
            settings.count_key.clone(),
            settings.visitors_key.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// POST `body` to `path` and return the reply's `result`
    async fn call(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Upstash request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let reply: Value = response.json().await?;

        if let Some(error) = reply.get("error").and_then(Value::as_str) {
            return Err(ServerError::Store(format!("Upstash {}: {}", path, error)));
        }
        if !status.is_success() {
            return Err(ServerError::Store(format!("Upstash {} returned {}", path, status)));
        }

        Ok(reply.get("result").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl VisitStore for UpstashVisitStore {
    async fn count(&self) -> Result<u64> {
        let result = self.call("/get", json!({ "key": self.count_key })).await?;
        value_to_count(&result)
    }

    async fn is_known(&self, visitor: &str) -> Result<bool> {
        let result = self
            .call(
                "/sismember",
                json!({ "key": self.visitors_key, "member": visitor }),
            )
            .await?;
        Ok(result.as_i64() == Some(1))
    }

    async fn record(&self, visitor: &str) -> Result<u64> {
        // SADD is the check-and-set: only the call that added the member counts it
        let added = self
            .call(
                "/sadd",
                json!({ "key": self.visitors_key, "member": visitor }),
            )
            .await?;
        if added.as_i64() != Some(1) {
            debug!("Visitor recorded by a concurrent request, reading count");
            return self.count().await;
        }

        let result = self.call("/incr", json!({ "key": self.count_key })).await?;
        value_to_count(&result)
    }
}

/// Interpret a Redis reply as a counter value
///
/// `GET` answers with a string (or null when unset) and `INCR` with a number;
/// nested replies may be wrapped as `{"result": ...}`.
pub(crate) fn value_to_count(value: &Value) -> Result<u64> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ServerError::Store(format!("Counter is not a count: {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ServerError::Store(format!("Counter is not a count: {:?}", s))),
        Value::Object(map) => match map.get("error").and_then(Value::as_str) {
            Some(error) => Err(ServerError::Store(error.to_string())),
            None => value_to_count(map.get("result").unwrap_or(&Value::Null)),
        },
        other => Err(ServerError::Store(format!("Unexpected counter reply: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_replies() {
        assert_eq!(value_to_count(&Value::Null).unwrap(), 0);
        assert_eq!(value_to_count(&json!("42")).unwrap(), 42);
        assert_eq!(value_to_count(&json!(7)).unwrap(), 7);
        assert_eq!(value_to_count(&json!({ "result": "13" })).unwrap(), 13);
    }

    #[test]
    fn garbage_counter_is_an_error() {
        assert!(value_to_count(&json!("abc")).is_err());
        assert!(value_to_count(&json!(-3)).is_err());
        assert!(value_to_count(&json!([1, 2])).is_err());
        assert!(value_to_count(&json!({ "error": "WRONGTYPE" })).is_err());
    }

    #[test]
    fn settings_without_credentials_are_rejected() {
        let settings = crate::config::ServerConfig::default().store;
        assert!(matches!(
            UpstashVisitStore::from_settings(&settings),
            Err(ServerError::Config(_))
        ));
    }
}
