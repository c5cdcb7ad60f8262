//! Error handling for the ledger node
//!
//! This module provides the error types shared by the state engine,
//! the persistence log and the peer synchronization loop.

use crate::core::Hash;
use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger operations
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// A non-reward transaction would overdraw the sender
    InsufficientBalance { required: u64, available: u64 },
    /// Block height does not continue the chain
    InvalidHeight { expected: u64, got: u64 },
    /// Block parent hash does not match the current latest block
    InvalidParent { expected: Hash, got: Hash },
    /// Corrupt or unparsable non-trailing log record
    MalformedRecord { line: usize, reason: String },
    /// File I/O errors
    Io(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Network communication errors
    Network(String),
    /// Configuration errors
    Config(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InsufficientBalance {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient balance: required {required}, available {available}"
                )
            }
            LedgerError::InvalidHeight { expected, got } => {
                write!(f, "Invalid block height: expected {expected}, got {got}")
            }
            LedgerError::InvalidParent { expected, got } => {
                write!(f, "Invalid parent hash: expected {expected}, got {got}")
            }
            LedgerError::MalformedRecord { line, reason } => {
                write!(f, "Malformed log record at line {line}: {reason}")
            }
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Network(msg) => write!(f, "Network error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
