//! Core ledger functionality
//!
//! This module contains the fundamental ledger components including
//! blocks, transactions, chain management, proof-of-work mining, and the
//! longest-chain consensus resolver.

pub mod block;
pub mod consensus;
pub mod ledger;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, GENESIS_PREVIOUS_HASH};
pub use consensus::{resolve, PeerChain};
pub use ledger::Ledger;
pub use proof_of_work::ProofOfWork;
pub use transaction::{Transaction, TIMESTAMP_FIELD};
