pub mod config;
pub mod keys;
pub mod paths;

pub use config::{AuthConfig, Config, ConfigError, LoggingConfig, ServerConfig, StorageConfig, UpstreamConfig, YoutubeConfig};
pub use keys::{KeyStore, generate_secret};
pub use paths::{PathManager, container_base_path};
