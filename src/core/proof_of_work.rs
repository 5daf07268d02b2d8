use crate::core::Block;
use log::info;

/// Nonce search over a draft block: the digest must start with
/// `difficulty` zero hex characters. Expected work grows by a factor of
/// 16 per difficulty step; the loop has no upper bound or timeout.
pub struct ProofOfWork {
    block: Block,
    prefix: String,
}

impl ProofOfWork {
    pub fn new_proof_of_work(block: Block, difficulty: usize) -> ProofOfWork {
        ProofOfWork {
            block,
            prefix: "0".repeat(difficulty),
        }
    }

    /// Search from nonce 0 upward until the digest satisfies the prefix
    /// predicate. Deterministic for a given draft, so two nodes mining the
    /// same draft find the same nonce.
    pub fn run(mut self) -> (u64, String) {
        self.block.set_nonce(0);
        let mut hash = self.block.compute_digest();
        while !hash.starts_with(&self.prefix) {
            self.block.set_nonce(self.block.nonce() + 1);
            hash = self.block.compute_digest();
        }
        info!(
            "Proof-of-work solved for block #{} at nonce {}: {hash}",
            self.block.index(),
            self.block.nonce()
        );
        (self.block.nonce(), hash)
    }
}
