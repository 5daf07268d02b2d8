use crate::core::{consensus, Block, Ledger, PeerChain, Transaction};
use crate::error::{NodeError, Result};
use crate::network::peer_directory::PeerDirectory;
use crate::network::server::{call, notify, Package, Reply};
use crate::utils::current_timestamp;
use log::{info, warn};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;

/// Client-supplied fields every transaction must carry, present and
/// non-empty.
pub const REQUIRED_FIELDS: [&str; 3] = ["Organisation", "Money", "Description"];

/// Payload-level view of the chain handed to clients and peers.
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    pub length: usize,
    pub blocks: Vec<Block>,
    pub peers: Vec<String>,
}

/// One ledger node: the chain and pending pool behind a single coarse
/// lock, the peer directory beside it, and the peer-facing operations the
/// transport dispatches into. Cloning shares the same state.
#[derive(Clone)]
pub struct Node {
    ledger: Arc<RwLock<Ledger>>,
    peers: Arc<PeerDirectory>,
    gossip_ttl: u32,
}

impl Node {
    pub fn new(addr: String, difficulty: usize, gossip_ttl: u32) -> Node {
        Node {
            ledger: Arc::new(RwLock::new(Ledger::new(difficulty))),
            peers: Arc::new(PeerDirectory::new(addr)),
            gossip_ttl,
        }
    }

    pub fn addr(&self) -> String {
        self.peers.self_addr().to_string()
    }

    pub fn peers(&self) -> &PeerDirectory {
        &self.peers
    }

    fn ledger_read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger
            .read()
            .expect("Failed to acquire read lock on ledger - this should never happen")
    }

    fn ledger_write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger
            .write()
            .expect("Failed to acquire write lock on ledger - this should never happen")
    }

    /// Send one package per peer on detached threads; every call carries
    /// its own timeout and a failed peer is simply skipped.
    fn fan_out(&self, packages: Vec<(String, Package)>) {
        for (peer, pkg) in packages {
            thread::spawn(move || notify(&peer, &pkg));
        }
    }

    /// Accept a transaction from a client: validate the required fields,
    /// stamp the receipt time, queue it, and relay it to every peer so any
    /// node can mine it.
    pub fn submit_transaction(&self, fields: Map<String, Value>) -> Result<Transaction> {
        let mut tx = Transaction::from_fields(fields);
        for field in REQUIRED_FIELDS {
            if !tx.has_value(field) {
                return Err(NodeError::Transaction(format!(
                    "Missing or empty required field: {field}"
                )));
            }
        }
        tx.stamp(current_timestamp()?);
        self.ledger_write().add_transaction(tx.clone());

        let addr_from = self.addr();
        let packages = self
            .peers
            .snapshot()
            .into_iter()
            .map(|peer| {
                (
                    peer,
                    Package::ShareTransaction {
                        addr_from: addr_from.clone(),
                        transaction: tx.clone(),
                    },
                )
            })
            .collect();
        self.fan_out(packages);

        Ok(tx)
    }

    /// Accept a transaction relayed by a peer. It is already stamped and is
    /// not relayed again.
    pub fn receive_shared_transaction(&self, tx: Transaction) -> Result<()> {
        for field in REQUIRED_FIELDS {
            if !tx.has_value(field) {
                return Err(NodeError::Transaction(format!(
                    "Missing or empty required field: {field}"
                )));
            }
        }
        if tx.timestamp().is_none() {
            return Err(NodeError::Transaction(
                "Missing or empty required field: timestamp".to_string(),
            ));
        }
        self.ledger_write().add_transaction(tx);
        Ok(())
    }

    /// Mine the pending pool, then reconcile with the network: if no peer
    /// held a longer chain, the new tip is announced to everyone.
    pub fn trigger_mine(&self) -> Result<Option<u64>> {
        let mined = self.ledger_write().mine()?;
        let Some(block) = mined else {
            return Ok(None);
        };

        // Another node may have advanced the network while we searched.
        let replaced = self.run_consensus();
        if !replaced {
            self.announce_block(&block);
        }
        Ok(Some(block.index()))
    }

    pub fn chain_snapshot(&self) -> ChainSnapshot {
        let ledger = self.ledger_read();
        ChainSnapshot {
            length: ledger.len(),
            blocks: ledger.blocks().to_vec(),
            peers: self.peers.snapshot(),
        }
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.ledger_read().pending().to_vec()
    }

    /// A block announced by a peer. On acceptance, pending entries the
    /// block already committed are dropped from the pool.
    pub fn receive_peer_block(&self, block: Block, claimed_hash: &str) -> bool {
        let mut ledger = self.ledger_write();
        if !ledger.accept_block(block, claimed_hash) {
            return false;
        }
        let tip = ledger.tip().clone();
        ledger.drop_committed(&tip);
        true
    }

    /// A pushed full-chain replacement. The dump is replayed for validity
    /// before anything is adopted; a dump that fails replay is the one
    /// hard failure in the protocol.
    pub fn receive_chain_dump(&self, blocks: Vec<Block>) -> Result<()> {
        let mut ledger = self.ledger_write();
        if !ledger.check_chain_validity(&blocks) {
            return Err(NodeError::TamperedChain(
                "Received chain dump failed validity replay".to_string(),
            ));
        }
        info!("Adopting a pushed chain of {} blocks", blocks.len());
        ledger.replace_chain(blocks);
        Ok(())
    }

    /// A newcomer introduced itself: record it, flood its address to the
    /// peers that were already known, and reply with the full chain.
    pub fn register_peer(&self, addr: &str) -> ChainSnapshot {
        let known = self.peers.snapshot();
        if self.peers.register(addr) && self.gossip_ttl > 0 {
            let addr_from = self.addr();
            let packages = known
                .into_iter()
                .map(|peer| {
                    (
                        peer,
                        Package::ShareNodes {
                            origin: addr.to_string(),
                            addr_from: addr_from.clone(),
                            ttl: self.gossip_ttl,
                        },
                    )
                })
                .collect();
            self.fan_out(packages);
        }
        self.chain_snapshot()
    }

    /// Bootstrap against one known-good node: introduce ourselves, then
    /// adopt its chain dump. The dump is verified before adoption; a dump
    /// that does not replay cleanly aborts the registration.
    pub fn register_with(&self, remote: &str) -> Result<()> {
        let reply = call(
            remote,
            &Package::RegisterNode {
                addr_from: self.addr(),
            },
        )?;
        match reply {
            Reply::Chain { blocks, .. } => {
                self.receive_chain_dump(blocks)?;
                self.peers.register(remote);
                info!("Registered with {remote}");
                Ok(())
            }
            Reply::Rejected { reason } => Err(NodeError::Network(format!(
                "Registration rejected by {remote}: {reason}"
            ))),
            other => Err(NodeError::Network(format!(
                "Unexpected registration reply from {remote}: {other:?}"
            ))),
        }
    }

    /// One hop of the peer-address flood.
    pub fn receive_gossip(&self, origin: &str, sender: &str, ttl: u32) {
        let forwards = self.peers.absorb_gossip(origin, sender, ttl);
        let addr_from = self.addr();
        let packages = forwards
            .into_iter()
            .map(|forward| {
                (
                    forward.to,
                    Package::ShareNodes {
                        origin: forward.origin,
                        addr_from: addr_from.clone(),
                        ttl: forward.ttl,
                    },
                )
            })
            .collect();
        self.fan_out(packages);
    }

    /// Fetch every peer's chain in parallel and adopt the longest valid
    /// one. Unreachable peers are skipped for the round; the fan-out is
    /// bounded by the per-call timeout. Returns true when the local chain
    /// was replaced.
    pub fn run_consensus(&self) -> bool {
        let peers = self.peers.snapshot();
        if peers.is_empty() {
            return false;
        }

        let mut candidates: Vec<PeerChain> = Vec::new();
        thread::scope(|scope| {
            let handles: Vec<_> = peers
                .iter()
                .map(|peer| {
                    scope.spawn(move || match call(peer, &Package::GetChain) {
                        Ok(Reply::Chain { length, blocks, .. }) => Some(PeerChain {
                            source: peer.clone(),
                            length,
                            blocks,
                        }),
                        Ok(other) => {
                            warn!("Unexpected chain reply from {peer}: {other:?}");
                            None
                        }
                        Err(e) => {
                            warn!("Skipping unreachable peer {peer}: {e}");
                            None
                        }
                    })
                })
                .collect();
            for handle in handles {
                if let Ok(Some(candidate)) = handle.join() {
                    candidates.push(candidate);
                }
            }
        });

        consensus::resolve(&mut self.ledger_write(), candidates)
    }

    /// Announce a freshly sealed block to every known peer.
    pub fn announce_block(&self, block: &Block) {
        let addr_from = self.addr();
        let packages = self
            .peers
            .snapshot()
            .into_iter()
            .map(|peer| {
                (
                    peer,
                    Package::AddBlock {
                        addr_from: addr_from.clone(),
                        block: block.clone(),
                    },
                )
            })
            .collect();
        self.fan_out(packages);
    }
}
