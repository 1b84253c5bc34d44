//! Application Layer
//!
//! Orchestrates record creation, pricing and the per-block refresh on top of
//! the domain ports.

pub mod comptroller;
pub mod error;
pub mod market_factory;
pub mod market_updater;
pub mod price_resolver;

pub use comptroller::sync_price_oracle;
pub use error::{IndexerError, Result};
pub use market_factory::MarketFactory;
pub use market_updater::MarketUpdater;
pub use price_resolver::{price_exponent, PriceResolver};
