//! # Mesh Ledger
//!
//! A single node in a permissionless replicated ledger. Transactions are
//! accepted into a pending pool, batched into blocks by proof-of-work
//! mining, and kept on a linear hash-linked chain; nodes reconcile with
//! each other by adopting the longest valid chain they can fetch, and the
//! peer set itself spreads through a TTL-bounded gossip flood.
//!
//! ## Layout
//! - `core/`: blocks, transactions, the ledger, mining, consensus
//! - `network/`: the JSON/TCP protocol, the node operations, peer gossip
//! - `config/`: environment-backed node settings
//! - `cli/`: command-line interface for the node and its clients
//! - `utils/`: hashing and clock helpers

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod utils;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use core::{resolve, Block, Ledger, PeerChain, ProofOfWork, Transaction};
pub use error::{NodeError, Result};
pub use network::{call, notify, ChainSnapshot, Node, Package, PeerDirectory, Reply, Server};
pub use utils::{current_timestamp, sha256_digest, sha256_hex};
