//! Configuration management for PeerForge services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Entity storage configuration
    pub storage: StorageConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the entity collection files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name for the user collection
    #[serde(default = "default_users_file")]
    pub users_file: String,

    /// File name for the paper collection
    #[serde(default = "default_papers_file")]
    pub papers_file: String,

    /// File name for the review collection
    #[serde(default = "default_reviews_file")]
    pub reviews_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Header carrying the caller's user ID
    #[serde(default = "default_caller_header")]
    pub caller_header: String,

    /// Name for the bootstrap admin created when no admin exists
    #[serde(default = "default_bootstrap_admin_name")]
    pub bootstrap_admin_name: String,

    /// Email for the bootstrap admin
    #[serde(default = "default_bootstrap_admin_email")]
    pub bootstrap_admin_email: String,

    /// Secret for the bootstrap admin (override in any real deployment)
    #[serde(default = "default_bootstrap_admin_secret")]
    pub bootstrap_admin_secret: String,

    /// Admin level label for the bootstrap admin
    #[serde(default = "default_bootstrap_admin_level")]
    pub bootstrap_admin_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_data_dir() -> String { "data".to_string() }
fn default_users_file() -> String { "users.json".to_string() }
fn default_papers_file() -> String { "papers.json".to_string() }
fn default_reviews_file() -> String { "reviews.json".to_string() }
fn default_caller_header() -> String { "X-User-ID".to_string() }
fn default_bootstrap_admin_name() -> String { "Admin".to_string() }
fn default_bootstrap_admin_email() -> String { "admin@peerforge.local".to_string() }
fn default_bootstrap_admin_secret() -> String { "admin123".to_string() }
fn default_bootstrap_admin_level() -> String { "System Admin".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "peerforge".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("storage.data_dir", "data")?
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Full path of the user collection file
    pub fn users_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.users_file)
    }

    /// Full path of the paper collection file
    pub fn papers_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.papers_file)
    }

    /// Full path of the review collection file
    pub fn reviews_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.reviews_file)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
                users_file: default_users_file(),
                papers_file: default_papers_file(),
                reviews_file: default_reviews_file(),
            },
            auth: AuthConfig {
                caller_header: default_caller_header(),
                bootstrap_admin_name: default_bootstrap_admin_name(),
                bootstrap_admin_email: default_bootstrap_admin_email(),
                bootstrap_admin_secret: default_bootstrap_admin_secret(),
                bootstrap_admin_level: default_bootstrap_admin_level(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
        }
    }
}
