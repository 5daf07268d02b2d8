//! Node integration tests
//!
//! Exercises the node boundary over real sockets: client operations,
//! bootstrap registration, block announcement, and peer gossip.

use mesh_ledger::{call, Node, Package, Reply, Server};
use serde_json::{json, Map, Value};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

fn sample_fields() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("Organisation".to_string(), json!("X"));
    fields.insert("Money".to_string(), json!(10));
    fields.insert("Description".to_string(), json!("test"));
    fields
}

/// Start a node with its own listener on an ephemeral port.
fn start_node(difficulty: usize) -> (Node, String) {
    let probe = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = probe.local_addr().unwrap().to_string();
    drop(probe);

    let node = Node::new(addr.clone(), difficulty, 3);
    let server = Server::bind(node.clone(), &addr).unwrap();
    thread::spawn(move || {
        let _ = server.run();
    });
    (node, addr)
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn test_client_mine_flow_over_tcp() {
    let (_node, addr) = start_node(1);

    let reply = call(&addr, &Package::NewTransaction {
        fields: sample_fields(),
    })
    .unwrap();
    assert!(matches!(reply, Reply::Ack));

    match call(&addr, &Package::Mine).unwrap() {
        Reply::Mined { index } => assert_eq!(index, 1),
        other => panic!("unexpected reply: {other:?}"),
    }

    match call(&addr, &Package::GetChain).unwrap() {
        Reply::Chain { length, blocks, .. } => {
            assert_eq!(length, 2);
            assert_eq!(blocks[1].index(), 1);
            assert!(blocks[1].hash().starts_with('0'));
        }
        other => panic!("unexpected reply: {other:?}"),
    }

    match call(&addr, &Package::GetPending).unwrap() {
        Reply::Pending { transactions } => assert!(transactions.is_empty()),
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[test]
fn test_mine_with_empty_pool_is_reported() {
    let (_node, addr) = start_node(1);
    let reply = call(&addr, &Package::Mine).unwrap();
    assert!(matches!(reply, Reply::NoPendingTransactions));
}

#[test]
fn test_invalid_transaction_is_rejected() {
    let (_node, addr) = start_node(1);

    let mut fields = sample_fields();
    fields.insert("Description".to_string(), json!(""));

    let reply = call(&addr, &Package::NewTransaction { fields }).unwrap();
    assert!(matches!(reply, Reply::Rejected { .. }));
}

#[test]
fn test_register_with_adopts_bootstrap_chain() {
    let (node_a, addr_a) = start_node(1);
    for _ in 0..2 {
        node_a.submit_transaction(sample_fields()).unwrap();
        node_a.trigger_mine().unwrap();
    }
    assert_eq!(node_a.chain_snapshot().length, 3);

    let (node_b, addr_b) = start_node(1);
    node_b.register_with(&addr_a).unwrap();

    // The joining node's chain equals the bootstrap node's exactly.
    let chain_a = node_a.chain_snapshot();
    let chain_b = node_b.chain_snapshot();
    assert_eq!(chain_b.length, chain_a.length);
    for (ours, theirs) in chain_b.blocks.iter().zip(chain_a.blocks.iter()) {
        assert_eq!(ours.hash(), theirs.hash());
    }

    // Both sides learned about each other.
    assert!(node_b.peers().contains(&addr_a));
    assert!(node_a.peers().contains(&addr_b));
}

#[test]
fn test_mined_block_is_announced_to_peers() {
    let (node_a, addr_a) = start_node(1);
    let (node_b, _addr_b) = start_node(1);
    node_b.register_with(&addr_a).unwrap();

    node_b.submit_transaction(sample_fields()).unwrap();
    node_b.trigger_mine().unwrap();
    assert_eq!(node_b.chain_snapshot().length, 2);

    // The announcement fan-out is asynchronous; poll the receiving side.
    assert!(wait_for(|| node_a.chain_snapshot().length == 2));
    assert_eq!(
        node_a.chain_snapshot().blocks[1].hash(),
        node_b.chain_snapshot().blocks[1].hash()
    );
}

#[test]
fn test_registration_gossip_reaches_existing_peers() {
    let (_node_a, addr_a) = start_node(1);
    let (node_b, _addr_b) = start_node(1);
    node_b.register_with(&addr_a).unwrap();

    let (node_c, addr_c) = start_node(1);
    node_c.register_with(&addr_a).unwrap();

    // A floods C's address to B.
    assert!(wait_for(|| node_b.peers().contains(&addr_c)));
}
