//! Core error types for the net worth ledger.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, the filesystem, etc.) are converted to these types by
//! the store implementations.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ledger::AssetCategory;
use crate::session::AuthError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger.
///
/// Nothing here is fatal: every variant leaves the ledger in its last
/// known-good state.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Store-agnostic error type for persistence operations.
///
/// Uses `String` for all details so the storage layer can convert
/// implementation-specific errors (Diesel, r2d2, io) into this format.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to reach the store.
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create store pool: {0}")]
    PoolCreationFailed(String),

    /// A read or write failed to execute.
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate snapshot id).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Schema migration failed.
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Validation errors for user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The sanitized input is not a number.
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    /// The input carried a minus sign.
    #[error("Value cannot be negative")]
    NegativeValue,

    /// The amount, or the sum it contributes to, exceeds what can be represented.
    #[error("Amount is too large")]
    AmountTooLarge,

    /// A goal must be strictly positive to be set.
    #[error("Goal must be greater than zero")]
    NonPositiveGoal,

    /// A required value was not supplied.
    #[error("Required field '{0}' is missing")]
    MissingField(String),

    /// Form-level failure: at least one field carries an error.
    #[error("{} field(s) are invalid", .fields.len())]
    ValidationFailed {
        fields: BTreeMap<AssetCategory, ValidationError>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Store(StoreError::Internal(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(StoreError::Serialization(err.to_string()))
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Store(StoreError::Serialization(err.to_string()))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::Store(StoreError::Serialization(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
