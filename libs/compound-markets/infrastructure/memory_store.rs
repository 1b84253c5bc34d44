//! In-memory market store
//!
//! Backs tests and embedders that do not need persistence. Records are
//! cloned in and out, so callers never hold a lock across a refresh.

use crate::domain::{Comptroller, Market, MarketStore, StoreResult};
use async_trait::async_trait;
use ethers::types::Address;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    markets: RwLock<HashMap<Address, Market>>,
    comptroller: RwLock<Option<Comptroller>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a comptroller record
    pub fn with_comptroller(comptroller: Comptroller) -> Self {
        Self {
            markets: RwLock::new(HashMap::new()),
            comptroller: RwLock::new(Some(comptroller)),
        }
    }

    pub async fn market_count(&self) -> usize {
        self.markets.read().await.len()
    }

    pub async fn markets(&self) -> Vec<Market> {
        self.markets.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl MarketStore for InMemoryStore {
    async fn load_market(&self, id: Address) -> StoreResult<Option<Market>> {
        Ok(self.markets.read().await.get(&id).cloned())
    }

    async fn save_market(&self, market: &Market) -> StoreResult<()> {
        self.markets.write().await.insert(market.id, market.clone());
        Ok(())
    }

    async fn load_comptroller(&self) -> StoreResult<Option<Comptroller>> {
        Ok(self.comptroller.read().await.clone())
    }

    async fn save_comptroller(&self, comptroller: &Comptroller) -> StoreResult<()> {
        *self.comptroller.write().await = Some(comptroller.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketKind;

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let store = InMemoryStore::new();
        let id = Address::repeat_byte(1);

        let mut market = Market::new(id, MarketKind::GeneralAsset);
        store.save_market(&market).await.unwrap();

        market.accrual_block_number = 42;
        store.save_market(&market).await.unwrap();

        assert_eq!(store.market_count().await, 1);
        let loaded = store.load_market(id).await.unwrap().unwrap();
        assert_eq!(loaded.accrual_block_number, 42);
    }

    #[tokio::test]
    async fn test_comptroller_singleton() {
        let store = InMemoryStore::new();
        assert_eq!(store.load_comptroller().await.unwrap(), None);

        let oracle = Address::repeat_byte(9);
        store.save_comptroller(&Comptroller::with_oracle(oracle)).await.unwrap();
        assert_eq!(
            store.load_comptroller().await.unwrap().and_then(|c| c.price_oracle),
            Some(oracle)
        );
    }
}
