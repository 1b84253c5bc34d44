//! Read-only contract capabilities
//!
//! The core never talks to a node directly. Everything it needs from chain
//! is expressed by the traits below; every read is pinned to a block and
//! either yields a value or a [`CallError`].

use super::protocol::ORACLE_V2_CUTOVER_BLOCK;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("{method}() reverted on {contract:#x}")]
    Reverted { contract: Address, method: &'static str },

    #[error("{method}() on {contract:#x} failed: {reason}")]
    Provider {
        contract: Address,
        method: &'static str,
        reason: String,
    },

    #[error("{method}() on {contract:#x} returned out-of-range value {value}")]
    OutOfRange {
        contract: Address,
        method: &'static str,
        value: U256,
    },
}

pub type CallResult<T> = std::result::Result<T, CallError>;

/// Price oracle contract generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleVersion {
    V1,
    V2,
}

impl std::fmt::Display for OracleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleVersion::V1 => write!(f, "PriceOracle"),
            OracleVersion::V2 => write!(f, "PriceOracle2"),
        }
    }
}

/// Oracle interface serving a given block height
pub fn select_oracle(block_number: u64) -> OracleVersion {
    if block_number < ORACLE_V2_CUTOVER_BLOCK {
        OracleVersion::V1
    } else {
        OracleVersion::V2
    }
}

/// Lending market (cToken) reads
#[async_trait]
pub trait CTokenReader: Send + Sync {
    async fn market_name(&self, market: Address, block: u64) -> CallResult<String>;
    async fn market_symbol(&self, market: Address, block: u64) -> CallResult<String>;
    async fn underlying(&self, market: Address, block: u64) -> CallResult<Address>;
    async fn accrual_block_number(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn total_supply(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn exchange_rate_stored(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn borrow_index(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn total_reserves(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn total_borrows(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn get_cash(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn supply_rate_per_block(&self, market: Address, block: u64) -> CallResult<U256>;
    async fn borrow_rate_per_block(&self, market: Address, block: u64) -> CallResult<U256>;
}

/// Underlying ERC20 reads
#[async_trait]
pub trait Erc20Reader: Send + Sync {
    async fn asset_decimals(&self, asset: Address, block: u64) -> CallResult<u8>;
    async fn asset_name(&self, asset: Address, block: u64) -> CallResult<String>;
    async fn asset_symbol(&self, asset: Address, block: u64) -> CallResult<String>;
}

/// Price oracle reads. Both versions answer `getUnderlyingPrice(market)`.
#[async_trait]
pub trait PriceOracleReader: Send + Sync {
    async fn underlying_price(
        &self,
        version: OracleVersion,
        oracle: Address,
        market: Address,
        block: u64,
    ) -> CallResult<U256>;
}

/// Comptroller reads
#[async_trait]
pub trait ComptrollerReader: Send + Sync {
    async fn price_oracle(&self, comptroller: Address, block: u64) -> CallResult<Address>;
}

/// Everything the market refresh path reads from chain
pub trait ChainReader: CTokenReader + Erc20Reader + PriceOracleReader {}

impl<T: CTokenReader + Erc20Reader + PriceOracleReader> ChainReader for T {}

/// Narrow a 256-bit word to `u64`
pub fn to_u64(contract: Address, method: &'static str, value: U256) -> CallResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(CallError::OutOfRange {
            contract,
            method,
            value,
        });
    }
    Ok(value.low_u64())
}
