// The ledger is the single owner of the chain and the pending pool.
// Every chain mutation funnels through accept_block; nothing else appends.

use crate::core::block::GENESIS_PREVIOUS_HASH;
use crate::core::{Block, ProofOfWork, Transaction};
use crate::error::Result;
use crate::utils::current_timestamp;
use log::info;

pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: usize,
}

impl Ledger {
    /// A fresh ledger holding only the sealed genesis block.
    pub fn new(difficulty: usize) -> Ledger {
        Ledger {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            difficulty,
        }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        self.chain.as_slice()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn tip(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds at least the genesis block")
    }

    pub fn pending(&self) -> &[Transaction] {
        self.pending.as_slice()
    }

    /// Queue a transaction for the next mined block. Field validation is
    /// the boundary layer's job; this always succeeds.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.pending.push(tx);
    }

    /// The single chain-mutation entry point. The block must extend the
    /// current tip and the claimed hash must be a true, difficulty-meeting
    /// digest of it. Rejection is a normal outcome (e.g. losing a race
    /// against another node's block), so this returns false, never errors.
    pub fn accept_block(&mut self, mut block: Block, claimed_hash: &str) -> bool {
        if block.previous_hash() != self.tip().hash() {
            return false;
        }
        if !self.is_valid_proof(&block, claimed_hash) {
            return false;
        }
        block.seal(claimed_hash.to_string());
        self.chain.push(block);
        true
    }

    /// A claimed hash must not just meet the difficulty prefix, it must be
    /// the actual digest of that exact block.
    pub fn is_valid_proof(&self, block: &Block, hash: &str) -> bool {
        hash.starts_with(&"0".repeat(self.difficulty)) && hash == block.compute_digest()
    }

    /// Replay validity over an externally supplied chain: index contiguity
    /// from 0, hash-linkage, digest reproduction for every block, and the
    /// difficulty prefix for every block after genesis. Never mutates the
    /// chain under validation.
    pub fn check_chain_validity(&self, chain: &[Block]) -> bool {
        if chain.is_empty() {
            return false;
        }
        let mut previous_hash = GENESIS_PREVIOUS_HASH;
        for (idx, block) in chain.iter().enumerate() {
            if block.index() != idx as u64 || block.previous_hash() != previous_hash {
                return false;
            }
            if idx == 0 {
                // Genesis carries no proof-of-work; its digest must still match.
                if block.hash() != block.compute_digest() {
                    return false;
                }
            } else if !self.is_valid_proof(block, block.hash()) {
                return false;
            }
            previous_hash = block.hash();
        }
        true
    }

    /// Drain the pending pool into a new block. Returns `Ok(None)` when
    /// there is nothing to mine. The pool is cleared only after the mined
    /// block has actually been appended, so a stale draft loses nothing.
    pub fn mine(&mut self) -> Result<Option<Block>> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let tip = self.tip();
        let mut draft = Block::new_block(
            tip.index() + 1,
            self.pending.clone(),
            current_timestamp()?,
            tip.hash().to_string(),
        );

        info!(
            "Mining block #{} with {} transactions (difficulty: {})",
            draft.index(),
            draft.transactions().len(),
            self.difficulty
        );
        let pow = ProofOfWork::new_proof_of_work(draft.clone(), self.difficulty);
        let (nonce, hash) = pow.run();
        draft.set_nonce(nonce);

        if !self.accept_block(draft, &hash) {
            return Ok(None);
        }
        self.pending.clear();

        let mined = self.tip().clone();
        info!("Mined block #{}: {}", mined.index(), mined.hash());
        Ok(Some(mined))
    }

    /// Wholesale chain replacement. Callers validate first; the pending
    /// pool is untouched.
    pub fn replace_chain(&mut self, blocks: Vec<Block>) {
        self.chain = blocks;
    }

    /// Remove pending entries already committed by the given block,
    /// matching on the stamped timestamp.
    pub fn drop_committed(&mut self, block: &Block) {
        let committed: Vec<f64> = block
            .transactions()
            .iter()
            .filter_map(Transaction::timestamp)
            .collect();
        self.pending
            .retain(|tx| tx.timestamp().map_or(true, |ts| !committed.contains(&ts)));
    }
}
