use crate::domain::{CallError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Contract call failed: {0}")]
    Call(#[from] CallError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
