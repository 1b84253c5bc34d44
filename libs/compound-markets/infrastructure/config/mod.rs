use crate::domain::protocol::default_comptroller;
use crate::domain::ProtocolAddresses;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Market indexer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    pub rpc: RpcConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Well-known market addresses; each entry falls back to the mainnet deployment
    #[serde(default)]
    pub protocol: ProtocolAddresses,
    #[serde(default = "default_comptroller")]
    pub comptroller: Address,
    /// Markets refreshed on every run
    #[serde(default)]
    pub markets: Vec<Address>,
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://compound_markets.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// How often `--watch` polls for a new block
    pub poll_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 12,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl IndexerConfig {
    /// Load configuration from YAML file and .env
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::parse(&yaml_content)?;

        dotenv::dotenv().ok();

        if let Ok(rpc_url) = std::env::var("RPC_URL") {
            info!("Overriding RPC URL from environment variable");
            config.rpc.url = rpc_url;
        }

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            info!("Overriding database URL from environment variable");
            config.database.url = db_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without consulting the environment
    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.rpc.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc.url cannot be empty (set it in YAML or RPC_URL)".to_string(),
            ));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url cannot be empty".to_string(),
            ));
        }

        if self.comptroller.is_zero() {
            return Err(ConfigError::ValidationError(
                "comptroller cannot be the zero address".to_string(),
            ));
        }

        if self.markets.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one market must be configured".to_string(),
            ));
        }

        if self.refresh.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "refresh.poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  RPC URL: {}", self.rpc.url);
        info!("  Database URL: {}", self.database.url);
        info!("  Comptroller: {:#x}", self.comptroller);
        info!("  Markets: {}", self.markets.len());
        info!("  Poll interval: {} seconds", self.refresh.poll_interval_secs);
        info!("  Log level: {}", self.log_level);
    }
}
