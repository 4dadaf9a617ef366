//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing input (empty field, bad email/phone shape,
    /// non-positive amount, self-transfer)
    #[error("Validation error: {0}")]
    Validation(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Transaction not found, or an empty filtered history
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Registration email collision
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Transfer amount exceeds sender balance
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Sender balance at validation time
        available: u64,
        /// Requested transfer amount
        requested: u64,
    },

    /// Redemption exceeds available points
    #[error("Insufficient points: available {available}, requested {requested}")]
    InsufficientPoints {
        /// Held points at validation time
        available: u64,
        /// Requested redemption
        requested: u64,
    },

    /// Arithmetic overflow or invariant violation detected defensively
    #[error("System error: {0}")]
    System(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
