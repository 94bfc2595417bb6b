//! Storage error types.
//!
//! # Purpose
//! One error enum for every MongoDB call, tagged with the operation that
//! failed so logs and callers can tell them apart.
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("{operation} failed: {source}")]
    Driver {
        operation: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    /// A document came back but did not decode into the collection's type.
    #[error("{operation} returned an undecodable document: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
}

impl StoreError {
    /// Classify a driver error raised by `operation`.
    pub(crate) fn from_driver(operation: &'static str, source: mongodb::error::Error) -> Self {
        if matches!(
            source.kind.as_ref(),
            mongodb::error::ErrorKind::BsonDeserialization(_)
        ) {
            StoreError::Decode { operation, source }
        } else {
            StoreError::Driver { operation, source }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
