use crate::core::{Block, Transaction};
use crate::error::{NodeError, Result};
use crate::network::Node;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Deserializer, Map, Value};
use std::io::BufReader;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// Upper bound on each outbound peer call; a peer slower than this is
/// skipped for the round.
const TCP_CALL_TIMEOUT: u64 = 5000;
const READ_TIMEOUT_SECS: u64 = 60;

/// P2P message types
#[derive(Debug, Serialize, Deserialize)]
pub enum Package {
    /// Client-facing: a new transaction without a timestamp yet.
    NewTransaction {
        fields: Map<String, Value>,
    },
    /// Peer-to-peer: a stamped transaction relayed from another pool.
    ShareTransaction {
        addr_from: String,
        transaction: Transaction,
    },
    Mine,
    GetChain,
    GetPending,
    /// A freshly mined block announcement; `block.hash` is the claimed proof.
    AddBlock {
        addr_from: String,
        block: Block,
    },
    /// Push-style full chain replacement.
    ChainDump {
        addr_from: String,
        blocks: Vec<Block>,
    },
    /// Bootstrap introduction; answered with the full chain snapshot.
    RegisterNode {
        addr_from: String,
    },
    /// Gossip flood carrying one peer address.
    ShareNodes {
        origin: String,
        addr_from: String,
        ttl: u32,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Reply {
    Ack,
    Rejected {
        reason: String,
    },
    Chain {
        length: usize,
        blocks: Vec<Block>,
        peers: Vec<String>,
    },
    Pending {
        transactions: Vec<Transaction>,
    },
    Mined {
        index: u64,
    },
    NoPendingTransactions,
}

/// TCP front for a node: one JSON request per connection round-trip,
/// answered on the same stream.
pub struct Server {
    node: Node,
    listener: TcpListener,
}

impl Server {
    pub fn bind(node: Node, addr: &str) -> Result<Server> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| NodeError::Network(format!("Failed to bind to {addr}: {e}")))?;
        Ok(Server { node, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| NodeError::Network(format!("Failed to read local address: {e}")))
    }

    /// Accept loop; one handler thread per inbound connection.
    pub fn run(&self) -> Result<()> {
        info!("Server listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let node = self.node.clone();
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(node, stream) {
                            error!("Error handling connection: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }

        Ok(())
    }
}

fn handle_connection(node: Node, stream: TcpStream) -> Result<()> {
    stream
        .set_read_timeout(Some(Duration::from_secs(READ_TIMEOUT_SECS)))
        .map_err(|e| NodeError::Network(format!("Failed to set read timeout: {e}")))?;

    let reader = BufReader::new(&stream);
    let pkg_reader = Deserializer::from_reader(reader).into_iter::<Package>();

    for pkg in pkg_reader {
        let pkg = pkg
            .map_err(|e| NodeError::Network(format!("Failed to deserialize package: {e}")))?;

        let reply = process_package(&node, pkg);
        serde_json::to_writer(&stream, &reply)
            .map_err(|e| NodeError::Network(format!("Failed to send reply: {e}")))?;
    }

    let _ = stream.shutdown(Shutdown::Both);
    Ok(())
}

fn process_package(node: &Node, pkg: Package) -> Reply {
    match pkg {
        Package::NewTransaction { fields } => match node.submit_transaction(fields) {
            Ok(_) => Reply::Ack,
            Err(e) => Reply::Rejected {
                reason: e.to_string(),
            },
        },
        Package::ShareTransaction {
            addr_from,
            transaction,
        } => match node.receive_shared_transaction(transaction) {
            Ok(()) => Reply::Ack,
            Err(e) => {
                warn!("Rejected shared transaction from {addr_from}: {e}");
                Reply::Rejected {
                    reason: e.to_string(),
                }
            }
        },
        Package::Mine => match node.trigger_mine() {
            Ok(Some(index)) => Reply::Mined { index },
            Ok(None) => Reply::NoPendingTransactions,
            Err(e) => Reply::Rejected {
                reason: e.to_string(),
            },
        },
        Package::GetChain => {
            let snapshot = node.chain_snapshot();
            Reply::Chain {
                length: snapshot.length,
                blocks: snapshot.blocks,
                peers: snapshot.peers,
            }
        }
        Package::GetPending => Reply::Pending {
            transactions: node.pending_transactions(),
        },
        Package::AddBlock { addr_from, block } => {
            let claimed_hash = block.hash().to_string();
            if node.receive_peer_block(block, &claimed_hash) {
                Reply::Ack
            } else {
                info!("Discarded a block announced by {addr_from}");
                Reply::Rejected {
                    reason: "The block was discarded by the node".to_string(),
                }
            }
        }
        Package::ChainDump { addr_from, blocks } => match node.receive_chain_dump(blocks) {
            Ok(()) => Reply::Ack,
            Err(e) => {
                warn!("Rejected chain dump from {addr_from}: {e}");
                Reply::Rejected {
                    reason: e.to_string(),
                }
            }
        },
        Package::RegisterNode { addr_from } => {
            let snapshot = node.register_peer(&addr_from);
            Reply::Chain {
                length: snapshot.length,
                blocks: snapshot.blocks,
                peers: snapshot.peers,
            }
        }
        Package::ShareNodes {
            origin,
            addr_from,
            ttl,
        } => {
            node.receive_gossip(&origin, &addr_from, ttl);
            Reply::Ack
        }
    }
}

/// Synchronous round-trip to one peer, bounded by connect, write, and read
/// timeouts.
pub fn call(addr: &str, pkg: &Package) -> Result<Reply> {
    let socket_addr = addr
        .parse::<SocketAddr>()
        .map_err(|e| NodeError::Network(format!("Invalid address {addr}: {e}")))?;

    let stream = TcpStream::connect_timeout(&socket_addr, Duration::from_millis(TCP_CALL_TIMEOUT))
        .map_err(|e| NodeError::Network(format!("Failed to connect to {addr}: {e}")))?;
    stream
        .set_write_timeout(Some(Duration::from_millis(TCP_CALL_TIMEOUT)))
        .map_err(|e| NodeError::Network(format!("Failed to set write timeout: {e}")))?;
    stream
        .set_read_timeout(Some(Duration::from_millis(TCP_CALL_TIMEOUT)))
        .map_err(|e| NodeError::Network(format!("Failed to set read timeout: {e}")))?;

    serde_json::to_writer(&stream, pkg)
        .map_err(|e| NodeError::Network(format!("Failed to send package to {addr}: {e}")))?;

    let mut de = Deserializer::from_reader(BufReader::new(&stream));
    let reply = Reply::deserialize(&mut de)
        .map_err(|e| NodeError::Network(format!("Failed to read reply from {addr}: {e}")))?;

    let _ = stream.shutdown(Shutdown::Both);
    Ok(reply)
}

/// Fire-and-forget variant used by announce and gossip fan-out: an
/// unreachable peer is skipped, never fatal.
pub fn notify(addr: &str, pkg: &Package) {
    if let Err(e) = call(addr, pkg) {
        warn!("Skipping unreachable peer {addr}: {e}");
    }
}
