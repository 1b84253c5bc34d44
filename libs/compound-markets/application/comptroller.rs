//! Comptroller tracking
//!
//! Keeps the stored comptroller record in step with the on-chain
//! `oracle()` so price lookups follow oracle migrations.

use super::error::Result;
use crate::domain::{Comptroller, ComptrollerReader, MarketStore};
use ethers::types::Address;
use tracing::info;

/// Read the comptroller's active oracle at `block_number` and persist it when it changed.
///
/// A zero address on chain means no oracle is set.
pub async fn sync_price_oracle<C, S>(
    chain: &C,
    store: &S,
    comptroller: Address,
    block_number: u64,
) -> Result<Comptroller>
where
    C: ComptrollerReader + ?Sized,
    S: MarketStore + ?Sized,
{
    let oracle = chain.price_oracle(comptroller, block_number).await?;
    let current = Comptroller {
        price_oracle: (!oracle.is_zero()).then_some(oracle),
    };

    let stored = store.load_comptroller().await?;
    if stored.as_ref() != Some(&current) {
        info!(
            "Price oracle changed at block {}: {:?} -> {:?}",
            block_number,
            stored.and_then(|c| c.price_oracle),
            current.price_oracle
        );
        store.save_comptroller(&current).await?;
    }

    Ok(current)
}
