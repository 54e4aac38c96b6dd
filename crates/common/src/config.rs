//! Application configuration.

use serde::Deserialize;
use std::collections::HashMap;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Attachment storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Complaint lifecycle configuration.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this deployment.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Local attachment storage.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory where uploaded files are written.
    #[serde(default = "default_files_path")]
    pub path: String,
    /// URL prefix under which stored files are served.
    #[serde(default = "default_files_base_url")]
    pub base_url: String,
    /// Maximum accepted size of a single upload, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            path: default_files_path(),
            base_url: default_files_base_url(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Status classification and penalty settings.
///
/// Statuses are named by their stored value (`open`, `under_investigation`,
/// `answered`, `resolved`, `closed`, `rejected_false`).
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// Status whose first log entry marks the start of an investigation.
    #[serde(default = "default_investigation_start")]
    pub investigation_start: String,
    /// Statuses that count as case closure.
    #[serde(default = "default_final_statuses")]
    pub final_statuses: Vec<String>,
    /// Number of false reports after which a student is blocked.
    #[serde(default = "default_false_report_threshold")]
    pub false_report_threshold: i32,
    /// Display label overrides keyed by status value.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            investigation_start: default_investigation_start(),
            final_statuses: default_final_statuses(),
            false_report_threshold: default_false_report_threshold(),
            labels: HashMap::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_files_path() -> String {
    "./uploads".to_string()
}

fn default_files_base_url() -> String {
    "/uploads".to_string()
}

const fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

fn default_investigation_start() -> String {
    "under_investigation".to_string()
}

fn default_final_statuses() -> Vec<String> {
    vec!["resolved".to_string(), "closed".to_string()]
}

const fn default_false_report_threshold() -> i32 {
    3
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FAROL_ENV`)
    /// 4. Environment variables with `FAROL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("FAROL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FAROL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
