//! Compound Market Indexer - Main Library
//!
//! Keeps normalized snapshots of Compound lending markets up to date.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **compound_markets**: Core market model and refresh logic (re-exported from workspace)
//! - **market_db**: SQLite market store (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use compound_market_indexer::bin_common::{load_config_from_env, ConfigType};
//! use compound_market_indexer::compound_markets::MarketUpdater;
//! ```

// Re-export workspace libraries for convenience
pub use compound_markets;
pub use market_db;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{has_flag, load_config_from_env, parse_args, positional_args, ConfigType};
    pub use runner::{interruptible_sleep, BinaryRunner, RunConfig};
}
