use crate::core::Transaction;
use crate::utils::sha256_hex;
use serde::{Deserialize, Serialize};

/// Placeholder predecessor hash carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// One batch of transactions, immutable once sealed. `hash` stays empty
/// until a valid proof has been found and `seal` stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    transactions: Vec<Transaction>,
    timestamp: f64,
    previous_hash: String,
    nonce: u64,
    #[serde(default)]
    hash: String,
}

/// Digest input view of a block. Field order here is the wire contract:
/// every node must hash `index, transactions, timestamp, previous_hash,
/// nonce` in exactly this order, with `hash` excluded.
#[derive(Serialize)]
struct DigestInput<'a> {
    index: u64,
    transactions: &'a [Transaction],
    timestamp: f64,
    previous_hash: &'a str,
    nonce: u64,
}

impl Block {
    /// Draft an unsealed block with nonce 0.
    pub fn new_block(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: f64,
        previous_hash: String,
    ) -> Block {
        Block {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        }
    }

    /// The fixed index-0 block. Its fields are constant, so its sealed hash
    /// is identical on every node; it carries no proof-of-work.
    pub fn genesis() -> Block {
        let mut block = Block::new_block(0, vec![], 0.0, String::from(GENESIS_PREVIOUS_HASH));
        let digest = block.compute_digest();
        block.seal(digest);
        block
    }

    /// Hex SHA-256 over the canonical serialization of everything except
    /// `hash`. Pure; a sealed block's stored hash must always reproduce.
    pub fn compute_digest(&self) -> String {
        let input = DigestInput {
            index: self.index,
            transactions: &self.transactions,
            timestamp: self.timestamp,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
        };
        let payload = serde_json::to_vec(&input)
            .expect("canonical block serialization should never fail");
        sha256_hex(&payload)
    }

    /// Store the winning digest. Only the acceptance path calls this.
    pub fn seal(&mut self, hash: String) {
        self.hash = hash;
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        self.hash.as_str()
    }

    #[cfg(test)]
    pub fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn sample_transaction() -> Transaction {
        let mut fields = Map::new();
        fields.insert("Organisation".to_string(), json!("X"));
        fields.insert("Money".to_string(), json!(10));
        fields.insert("Description".to_string(), json!("test"));
        let mut tx = Transaction::from_fields(fields);
        tx.stamp(1700000000.5);
        tx
    }

    #[test]
    fn test_digest_excludes_hash_field() {
        let mut block = Block::new_block(1, vec![sample_transaction()], 2.5, "abc".to_string());
        let before = block.compute_digest();
        block.seal(before.clone());
        // Sealing must not change what the digest covers.
        assert_eq!(block.compute_digest(), before);
    }

    #[test]
    fn test_digest_covers_nonce() {
        let mut block = Block::new_block(1, vec![sample_transaction()], 2.5, "abc".to_string());
        let at_zero = block.compute_digest();
        block.set_nonce(1);
        assert_ne!(block.compute_digest(), at_zero);
    }

    #[test]
    fn test_digest_covers_transactions() {
        let with_tx = Block::new_block(1, vec![sample_transaction()], 2.5, "abc".to_string());
        let without_tx = Block::new_block(1, vec![], 2.5, "abc".to_string());
        assert_ne!(with_tx.compute_digest(), without_tx.compute_digest());
    }

    #[test]
    fn test_digest_survives_wire_round_trip() {
        let mut block = Block::new_block(3, vec![sample_transaction()], 1700000001.25, "00ff".to_string());
        block.set_nonce(42);
        block.seal(block.compute_digest());

        let encoded = serde_json::to_string(&block).unwrap();
        let decoded: Block = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.compute_digest(), decoded.hash());
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_genesis_is_stable() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a, b);
        assert_eq!(a.index(), 0);
        assert_eq!(a.previous_hash(), GENESIS_PREVIOUS_HASH);
        assert!(a.transactions().is_empty());
        assert_eq!(a.hash(), a.compute_digest());
    }
}
