//! Record storage port

use super::market::{Comptroller, Market};
use async_trait::async_trait;
use ethers::types::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Lookup and persistence of markets by address, plus the comptroller singleton
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn load_market(&self, id: Address) -> StoreResult<Option<Market>>;

    /// Insert or replace the record keyed by `market.id`
    async fn save_market(&self, market: &Market) -> StoreResult<()>;

    async fn load_comptroller(&self) -> StoreResult<Option<Comptroller>>;

    async fn save_comptroller(&self, comptroller: &Comptroller) -> StoreResult<()>;
}
