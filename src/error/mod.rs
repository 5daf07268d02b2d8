//! Error handling for the ledger node
//!
//! This module provides the error types shared by all node operations.

use std::fmt;

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Error types for node operations
#[derive(Debug, Clone)]
pub enum NodeError {
    /// Transaction validation errors (missing or empty required fields)
    Transaction(String),
    /// Block validation errors
    InvalidBlock(String),
    /// A received chain dump failed validity replay
    TamperedChain(String),
    /// Network communication errors
    Network(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Configuration errors
    Config(String),
    /// Clock/cryptographic operation errors
    Crypto(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            NodeError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            NodeError::TamperedChain(msg) => write!(f, "Tampered chain: {msg}"),
            NodeError::Network(msg) => write!(f, "Network error: {msg}"),
            NodeError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            NodeError::Io(msg) => write!(f, "I/O error: {msg}"),
            NodeError::Config(msg) => write!(f, "Configuration error: {msg}"),
            NodeError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
        }
    }
}

impl std::error::Error for NodeError {}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        NodeError::Serialization(err.to_string())
    }
}
