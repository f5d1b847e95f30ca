use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{GatewayError, Result};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 40;
// 未设置 PROXY_TOKEN 时的占位令牌，仅适合本地调试，生产环境必须显式配置
pub const DEFAULT_PROXY_TOKEN: &str = "secret";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub models: ModelPolicy,
    /// Secrets never come from the config file.
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_upstream_url() -> String {
    DEFAULT_OPENAI_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which model identifiers the deployment is willing to forward.
///
/// `allowed = None` accepts any non-empty model string; reasoning-class
/// handling is decided separately by the payload builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelPolicy {
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
}

impl ModelPolicy {
    pub fn permits(&self, model: &str) -> bool {
        match &self.allowed {
            Some(list) => list.iter().any(|m| m == model),
            None => true,
        }
    }
}

/// Upstream API key and proxy access token, read once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub proxy_token: String,
    /// False when `proxy_token` fell back to the placeholder.
    pub proxy_token_configured: bool,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            proxy_token: DEFAULT_PROXY_TOKEN.to_string(),
            proxy_token_configured: false,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("proxy_token", &"<redacted>")
            .field("proxy_token_configured", &self.proxy_token_configured)
            .finish()
    }
}

impl Credentials {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty());
        let proxy_token = lookup("PROXY_TOKEN");
        Self {
            openai_api_key,
            proxy_token_configured: proxy_token.is_some(),
            proxy_token: proxy_token.unwrap_or_else(|| DEFAULT_PROXY_TOKEN.to_string()),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut settings = match Self::find_config_file() {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path);
                Self::from_file(&path)?
            }
            None => Settings::default(),
        };

        settings.apply_overrides(|k| std::env::var(k).ok())?;
        settings.credentials = Credentials::from_env();
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        if settings.upstream.timeout_secs == 0 {
            return Err(GatewayError::Config(
                "upstream.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(settings)
    }

    /// Environment overrides: `HOST`, `PORT`, `OPENAI_URL`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| GatewayError::Config(format!("invalid PORT: {}", port)))?;
        }
        if let Some(url) = lookup("OPENAI_URL").filter(|v| !v.trim().is_empty()) {
            self.upstream.url = url;
        }
        Ok(())
    }

    fn find_config_file() -> Option<String> {
        if let Ok(path) = std::env::var("REASON_PROXY_CONFIG") {
            if !path.trim().is_empty() {
                return Some(path);
            }
        }

        let possible_names = ["custom-config.toml", "config.toml"];
        possible_names
            .iter()
            .find(|name| Path::new(name).exists())
            .map(|name| name.to_string())
    }
}
