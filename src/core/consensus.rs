use crate::core::{Block, Ledger};
use log::{info, warn};

/// One peer's chain as reported during a consensus round.
pub struct PeerChain {
    pub source: String,
    pub length: usize,
    pub blocks: Vec<Block>,
}

/// Longest-valid-chain rule. A candidate wins only when it is strictly
/// longer than the best seen so far (the local chain initially) and passes
/// full validity replay; equal length never replaces the local chain. On a
/// win the local chain is replaced wholesale and this returns true.
pub fn resolve(ledger: &mut Ledger, candidates: Vec<PeerChain>) -> bool {
    let mut best: Option<Vec<Block>> = None;
    let mut best_len = ledger.len();

    for candidate in candidates {
        // A reported length that disagrees with the payload is not trusted.
        if candidate.length != candidate.blocks.len() {
            warn!(
                "Peer {} reported length {} but sent {} blocks, skipping",
                candidate.source,
                candidate.length,
                candidate.blocks.len()
            );
            continue;
        }
        if candidate.length <= best_len {
            continue;
        }
        if !ledger.check_chain_validity(&candidate.blocks) {
            warn!("Peer {} sent an invalid chain, skipping", candidate.source);
            continue;
        }
        best_len = candidate.length;
        best = Some(candidate.blocks);
    }

    match best {
        Some(blocks) => {
            info!("Adopting a longer chain of {best_len} blocks");
            ledger.replace_chain(blocks);
            true
        }
        None => false,
    }
}
