//! Integration test: Configuration utilities
//!
//! Tests the bin_common path resolution together with the indexer config loader.

use compound_market_indexer::bin_common::{load_config_from_env, ConfigType};
use compound_market_indexer::compound_markets::IndexerConfig;
use std::env;

#[test]
fn test_indexer_config_default() {
    // Clear env var to test default
    env::remove_var("INDEXER_CONFIG_PATH");

    let config_path = load_config_from_env(ConfigType::Indexer);
    assert_eq!(config_path.to_str().unwrap(), "config/indexer.yaml");
}

#[test]
fn test_custom_config() {
    let custom = ConfigType::Custom("custom/path.yaml".to_string());
    let config_path = load_config_from_env(custom);

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
fn test_config_type_env_var_names() {
    assert_eq!(ConfigType::Indexer.env_var_name(), "INDEXER_CONFIG_PATH");
}

#[test]
fn test_shipped_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/indexer.yaml");
    let yaml = std::fs::read_to_string(path).unwrap();

    let config = IndexerConfig::parse(&yaml).unwrap();
    config.validate().unwrap();

    assert!(config.markets.contains(&config.protocol.native_market));
    assert!(config.markets.contains(&config.protocol.reference_market));
}
