//! Domain Layer
//!
//! Market model, fixed-point normalization and the ports (contract reads,
//! storage) the application layer is written against. No I/O lives here.

pub mod contracts;
pub mod decimal;
pub mod market;
pub mod protocol;
pub mod store;

pub use contracts::{
    select_oracle, CTokenReader, CallError, CallResult, ChainReader, ComptrollerReader,
    Erc20Reader, OracleVersion, PriceOracleReader,
};
pub use market::{Comptroller, Market, MarketKind};
pub use protocol::ProtocolAddresses;
pub use store::{MarketStore, StoreError, StoreResult};
