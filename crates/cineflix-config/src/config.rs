use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Settings for every outbound fetch against the movie database site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Listing pages fetched per category request
    #[serde(default = "default_category_pages")]
    pub category_pages: u32,
    /// Upper bound on simultaneous listing page fetches
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_youtube_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: Option<bool>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://www.themoviedb.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_category_pages() -> u32 {
    10
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_youtube_api_url() -> String {
    "https://www.googleapis.com/youtube/v3/search".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            tmdb_base_url: default_tmdb_base_url(),
            timeout_secs: default_timeout_secs(),
            category_pages: default_category_pages(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_youtube_api_url(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Environment variables win over the file (container deployments set these)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("CINEFLIX_BIND") {
            self.server.bind = bind;
        }
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            if !key.is_empty() {
                self.youtube.api_key = Some(key);
            }
        }
        if let Ok(dir) = std::env::var("CINEFLIX_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Invalid("upstream.timeout_secs must be greater than zero".to_string()));
        }
        if self.upstream.category_pages == 0 {
            return Err(ConfigError::Invalid("upstream.category_pages must be greater than zero".to_string()));
        }
        if self.upstream.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid("upstream.max_concurrent_fetches must be greater than zero".to_string()));
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid("auth.token_ttl_minutes must be positive".to_string()));
        }

        url::Url::parse(&self.upstream.tmdb_base_url)
            .map_err(|e| ConfigError::Invalid(format!("upstream.tmdb_base_url is not a valid URL: {}", e)))?;
        if self.upstream.tmdb_base_url.ends_with('/') {
            return Err(ConfigError::Invalid("upstream.tmdb_base_url must not end with '/'".to_string()));
        }
        url::Url::parse(&self.youtube.api_url)
            .map_err(|e| ConfigError::Invalid(format!("youtube.api_url is not a valid URL: {}", e)))?;

        self.server
            .bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| ConfigError::Invalid(format!("server.bind '{}' is not a socket address: {}", self.server.bind, e)))?;

        Ok(())
    }

    pub fn is_youtube_configured(&self) -> bool {
        self.youtube
            .api_key
            .as_ref()
            .is_some_and(|key| !key.is_empty() && key != "YOUR_API_KEY")
    }
}
