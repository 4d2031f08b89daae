/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_store")]
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Upstash REST endpoint, e.g. `https://eu1-foo.upstash.io`
    #[serde(default)]
    pub upstash_url: Option<String>,

    #[serde(default)]
    pub upstash_token: Option<String>,

    /// Counter key
    #[serde(default = "default_count_key")]
    pub count_key: String,

    /// Set of hashed visitor addresses
    #[serde(default = "default_visitors_key")]
    pub visitors_key: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local; counts reset on restart
    Memory,
    Upstash,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `config.toml` in the working directory; a missing
    /// default file is not an error. Environment variables prefixed with
    /// `AFK_` override the file (`AFK_SERVER__PORT=9000`). The deployment
    /// variables `UPSTASH_REST_URL` / `UPSTASH_REST_TOKEN` are honoured too.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("AFK")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let mut config: Self = config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        config.apply_upstash_env(
            std::env::var("UPSTASH_REST_URL").ok(),
            std::env::var("UPSTASH_REST_TOKEN").ok(),
        );
        Ok(config)
    }

    /// Fill missing Upstash credentials from the platform variables
    ///
    /// Setting a URL this way also selects the Upstash backend, as long as
    /// no backend was configured explicitly.
    pub fn apply_upstash_env(&mut self, url: Option<String>, token: Option<String>) {
        let url = url.filter(|u| !u.trim().is_empty());
        if self.store.upstash_url.is_none() {
            if let Some(url) = url {
                self.store.upstash_url = Some(url);
                if self.store.backend == StoreBackend::Memory {
                    self.store.backend = StoreBackend::Upstash;
                }
            }
        }
        if self.store.upstash_token.is_none() {
            self.store.upstash_token = token.filter(|t| !t.trim().is_empty());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Upstash {
            let url = self.store.upstash_url.as_deref().unwrap_or_default();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ServerError::Config(
                    "Upstash URL must start with http:// or https:// (set UPSTASH_REST_URL)"
                        .to_string(),
                ));
            }
            if self.store.upstash_token.as_deref().unwrap_or_default().is_empty() {
                return Err(ServerError::Config(
                    "Upstash token is required (set UPSTASH_REST_TOKEN)".to_string(),
                ));
            }
        }

        if self.store.count_key.is_empty() || self.store.visitors_key.is_empty() {
            return Err(ServerError::Config("Store keys must not be empty".to_string()));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_store() -> StoreSettings {
    StoreSettings {
        backend: default_backend(),
        upstash_url: None,
        upstash_token: None,
        count_key: default_count_key(),
        visitors_key: default_visitors_key(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_count_key() -> String {
    "afk:count".to_string()
}

fn default_visitors_key() -> String {
    "afk:ips".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            store: default_store(),
        }
    }
}
