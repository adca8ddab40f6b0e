//! The `error` module defines the error types used within the `rfq` application.
//!
//! This module centralizes error handling, providing a consistent way to
//! represent and propagate errors throughout the system.

use thiserror::Error;

/// Errors surfaced by queue operations and the underlying store.
///
/// Every mutating queue operation is a single atomic store call, so a failed
/// operation never leaves partial state behind; callers may retry freely.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store could not be reached or rejected the operation.
    /// Retry policy is a caller concern; nothing is retried internally.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The topic name is not alphanumeric (plus `-`/`_`).
    #[error("invalid topic name: {0:?}")]
    InvalidTopic(String),

    /// The store returned data that does not decode to what the queue wrote,
    /// e.g. a leased message id with no stored payload.
    #[error("corrupt store entry at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Payload or list encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Error::StoreUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
