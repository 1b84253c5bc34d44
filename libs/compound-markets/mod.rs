//! Compound Markets
//!
//! Maintains normalized snapshots of Compound-style lending markets: balances,
//! exchange rates, annualized interest rates and oracle prices in both the
//! native currency and USD, recomputed at most once per block.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    price_exponent, sync_price_oracle, IndexerError, MarketFactory, MarketUpdater, PriceResolver,
    Result,
};
pub use domain::{
    CallError, ChainReader, Comptroller, Market, MarketKind, MarketStore, OracleVersion,
    ProtocolAddresses, StoreError,
};
pub use infrastructure::{init_tracing, EthersChainReader, InMemoryStore, IndexerConfig};
