//! Chain clients

pub mod compound;

pub use compound::EthersChainReader;
