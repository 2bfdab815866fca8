//! Error types for the object pool

use crate::pool::PoolState;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool {pool} is not running (state: {state})")]
    NotRunning { pool: String, state: PoolState },

    #[error("Pool {pool} exceeded max waiter size: {max_waiters}")]
    CapacityExceeded { pool: String, max_waiters: usize },

    #[error("Object creation failed: {0}")]
    CreateFailed(String),

    #[error("Object destruction failed: {0}")]
    DestroyFailed(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("{} of the awaited operations failed", .0.len())]
    Aggregate(Vec<PoolError>),

    #[error("Invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No tokio runtime is available to drive pool timers")]
    RuntimeUnavailable,
}

pub type PoolResult<T> = Result<T, PoolError>;
