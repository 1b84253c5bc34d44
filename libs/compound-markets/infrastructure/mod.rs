//! Infrastructure Layer
//!
//! Implementations of the domain ports (ethers contract reads, in-memory
//! storage) plus configuration and logging.

pub mod client;
pub mod config;
pub mod logging;
pub mod memory_store;

pub use client::EthersChainReader;
pub use config::{ConfigError, IndexerConfig};
pub use logging::{init_tracing, init_tracing_with};
pub use memory_store::InMemoryStore;
