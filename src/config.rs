use crate::error::ConfigError;
use crate::registry::Registry;
use crate::types::WebhookDefinition;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "RELAY_CONFIG";
pub const HOST_ENV: &str = "RELAY_HOST";
pub const PORT_ENV: &str = "RELAY_PORT";

const DEFAULT_CONFIG_PATH: &str = "webhooks.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: d_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL, without the trailing `/bot<token>` part.
    #[serde(default = "d_api_base")]
    pub api_base: String,
    /// Upper bound on a single `sendMessage` call.
    #[serde(default = "d_timeout_secs")]
    pub timeout_secs: u64,
}

impl TelegramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: d_api_base(),
            timeout_secs: d_timeout_secs(),
        }
    }
}

/// On-disk configuration document.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    telegram: TelegramConfig,
    webhooks: Vec<WebhookDefinition>,
}

pub struct Config {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    pub registry: Registry,
    pub path: PathBuf,
}

impl Config {
    /// Load from `$RELAY_CONFIG` (default `webhooks.json`), then apply the
    /// `RELAY_HOST` / `RELAY_PORT` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::load_from(&path)?;

        if let Ok(host) = std::env::var(HOST_ENV) {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            config.server.port = port.parse().map_err(|_| ConfigError::Env {
                var: PORT_ENV,
                value: port,
            })?;
        }

        Ok(config)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: PathBuf) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        if raw.telegram.timeout_secs == 0 {
            return Err(ConfigError::Invalid("telegram.timeout_secs must be positive".into()));
        }

        Ok(Self {
            server: raw.server,
            telegram: raw.telegram,
            registry: Registry::from_definitions(raw.webhooks)?,
            path,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_host() -> String {
    "127.0.0.1".into()
}

fn d_port() -> u16 {
    8000
}

fn d_api_base() -> String {
    "https://api.telegram.org".into()
}

fn d_timeout_secs() -> u64 {
    10
}
