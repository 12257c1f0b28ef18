use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};
use tracing::debug;

pub const API_KEY_VAR: &str = "EXCHANGE_RATE_API_KEY";
pub const LISTEN_ADDR_VAR: &str = "XRATE_LISTEN_ADDR";
pub const PUBLIC_URL_VAR: &str = "XRATE_PUBLIC_URL";
pub const PROVIDER_URL_VAR: &str = "XRATE_PROVIDER_URL";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_PROVIDER_URL: &str = "https://v6.exchangerate-api.com/v6";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ServerConfig {
    pub listen_addr: Option<String>,
    /// Absolute site root used in robots.txt and sitemap.xml, e.g. `https://fx.example.com`.
    pub public_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
}

/// Optional settings read from the YAML config file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl FileConfig {
    /// Loads the default config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "xrate", "xrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

/// Process-wide settings, resolved once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub provider_base_url: String,
    pub listen_addr: String,
    pub public_url: Option<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("provider_base_url", &self.provider_base_url)
            .field("listen_addr", &self.listen_addr)
            .field("public_url", &self.public_url)
            .finish()
    }
}

impl AppConfig {
    /// Reads `.env`, the config file and the process environment.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let file = match config_path {
            Some(path) => FileConfig::load_from_path(path)?,
            None => FileConfig::load()?,
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merges file settings with environment values; the environment wins.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let Some(api_key) = lookup(API_KEY_VAR) else {
            bail!(
                "{API_KEY_VAR} environment variable is not set. Please set it in your .env file or environment."
            );
        };

        let provider_base_url = lookup(PROVIDER_URL_VAR)
            .or(file.provider.base_url)
            .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let listen_addr = lookup(LISTEN_ADDR_VAR)
            .or(file.server.listen_addr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let public_url = lookup(PUBLIC_URL_VAR)
            .or(file.server.public_url)
            .map(|url| url.trim_end_matches('/').to_string());

        Ok(Self {
            api_key,
            provider_base_url,
            listen_addr,
            public_url,
        })
    }

    pub fn with_listen_addr(mut self, listen_addr: Option<String>) -> Self {
        if let Some(addr) = listen_addr {
            self.listen_addr = addr;
        }
        self
    }
}
