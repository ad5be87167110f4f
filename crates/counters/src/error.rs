use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Counter storage is unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Display threshold must be zero or greater, got {0}")]
    InvalidThreshold(i64),

    #[error(transparent)]
    InvalidInput(#[from] CoreError),
}
