//! Peer-to-peer networking functionality
//!
//! This module handles communication between ledger nodes: the JSON/TCP
//! request-reply protocol, block and transaction propagation, chain
//! fetches for consensus, and the gossip flood that spreads peer
//! addresses.

pub mod node;
pub mod peer_directory;
pub mod server;

pub use node::{ChainSnapshot, Node, REQUIRED_FIELDS};
pub use peer_directory::{GossipForward, PeerDirectory};
pub use server::{call, notify, Package, Reply, Server};
