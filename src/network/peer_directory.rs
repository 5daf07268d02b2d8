use log::info;
use std::collections::HashSet;
use std::sync::RwLock;

/// A gossip rebroadcast scheduled for delivery to one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GossipForward {
    pub to: String,
    pub origin: String,
    pub ttl: u32,
}

/// The set of peer addresses this node knows about.
///
/// The set only grows: addresses arrive through registration and gossip,
/// and nothing evicts them short of an explicit `clear`. The node's own
/// address is never stored.
pub struct PeerDirectory {
    self_addr: String,
    peers: RwLock<HashSet<String>>,
}

impl PeerDirectory {
    pub fn new(self_addr: String) -> PeerDirectory {
        PeerDirectory {
            self_addr,
            peers: RwLock::new(HashSet::new()),
        }
    }

    pub fn self_addr(&self) -> &str {
        self.self_addr.as_str()
    }

    /// Idempotent add. Returns true when the address was new.
    pub fn register(&self, addr: &str) -> bool {
        if addr == self.self_addr {
            return false;
        }
        let mut peers = self
            .peers
            .write()
            .expect("Failed to acquire write lock on peers - this should never happen");
        let added = peers.insert(addr.to_string());
        if added {
            info!("Registered peer: {addr}");
        }
        added
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.peers
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .contains(addr)
    }

    pub fn len(&self) -> usize {
        self.peers
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .is_empty()
    }

    /// Sorted copy of the peer set, so callers fan out in a stable order.
    pub fn snapshot(&self) -> Vec<String> {
        let mut peers: Vec<String> = self
            .peers
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .iter()
            .cloned()
            .collect();
        peers.sort();
        peers
    }

    /// Administrative reset.
    pub fn clear(&self) {
        self.peers
            .write()
            .expect("Failed to acquire write lock on peers - this should never happen")
            .clear();
    }

    /// Take in one gossip message: learn the sender and the origin, and if
    /// the decremented ttl is still positive, schedule a rebroadcast to
    /// every currently known peer. The strictly decreasing ttl bounds the
    /// flood at `peers x ttl` messages. Dispatch is left to the caller.
    pub fn absorb_gossip(&self, origin: &str, sender: &str, ttl: u32) -> Vec<GossipForward> {
        self.register(sender);
        self.register(origin);

        let ttl = ttl.saturating_sub(1);
        if ttl == 0 {
            return Vec::new();
        }
        self.snapshot()
            .into_iter()
            .map(|to| GossipForward {
                to,
                origin: origin.to_string(),
                ttl,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};

    #[test]
    fn test_register_is_idempotent() {
        let directory = PeerDirectory::new("127.0.0.1:8001".to_string());
        assert!(directory.register("127.0.0.1:8002"));
        assert!(!directory.register("127.0.0.1:8002"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_self_address_is_never_added() {
        let directory = PeerDirectory::new("127.0.0.1:8001".to_string());
        assert!(!directory.register("127.0.0.1:8001"));
        assert!(directory.is_empty());

        directory.absorb_gossip("127.0.0.1:8001", "127.0.0.1:8001", 3);
        assert!(directory.is_empty());
    }

    #[test]
    fn test_clear_resets_the_directory() {
        let directory = PeerDirectory::new("127.0.0.1:8001".to_string());
        directory.register("127.0.0.1:8002");
        directory.register("127.0.0.1:8003");
        directory.clear();
        assert!(directory.is_empty());
    }

    #[test]
    fn test_absorb_gossip_learns_sender_and_origin() {
        let directory = PeerDirectory::new("127.0.0.1:8001".to_string());
        let forwards = directory.absorb_gossip("127.0.0.1:9000", "127.0.0.1:8002", 2);

        assert!(directory.contains("127.0.0.1:9000"));
        assert!(directory.contains("127.0.0.1:8002"));
        // ttl 2 -> 1, rebroadcast to both known peers
        assert_eq!(forwards.len(), 2);
        assert!(forwards.iter().all(|f| f.ttl == 1));
        assert!(forwards.iter().all(|f| f.origin == "127.0.0.1:9000"));
    }

    #[test]
    fn test_absorb_gossip_with_exhausted_ttl_stops() {
        let directory = PeerDirectory::new("127.0.0.1:8001".to_string());
        assert!(directory.absorb_gossip("127.0.0.1:9000", "127.0.0.1:8002", 1).is_empty());
        assert!(directory.absorb_gossip("127.0.0.1:9001", "127.0.0.1:8003", 0).is_empty());
        // The addresses are still learned even when nothing is rebroadcast.
        assert!(directory.contains("127.0.0.1:9000"));
    }

    // Line topology A-B-C-D-E, flood started by A with ttl 3: the origin
    // address must reach D (three hops out) but never E (four hops out).
    #[test]
    fn test_gossip_flood_depth_in_line_topology() {
        let addrs: Vec<String> = (1..=5).map(|i| format!("127.0.0.1:800{i}")).collect();
        let mut directories: HashMap<String, PeerDirectory> = HashMap::new();
        for (i, addr) in addrs.iter().enumerate() {
            let directory = PeerDirectory::new(addr.clone());
            if i > 0 {
                directory.register(&addrs[i - 1]);
            }
            if i + 1 < addrs.len() {
                directory.register(&addrs[i + 1]);
            }
            directories.insert(addr.clone(), directory);
        }

        let origin = "127.0.0.1:9000";
        // Node A starts the flood toward its own peers, as register_peer does.
        let mut queue: VecDeque<(String, String, u32)> = directories[&addrs[0]]
            .snapshot()
            .into_iter()
            .map(|to| (to, addrs[0].clone(), 3))
            .collect();

        while let Some((to, sender, ttl)) = queue.pop_front() {
            // Addresses outside the topology (the origin itself) drop the message.
            let Some(directory) = directories.get(&to) else {
                continue;
            };
            for forward in directory.absorb_gossip(origin, &sender, ttl) {
                queue.push_back((forward.to, to.clone(), forward.ttl));
            }
        }

        assert!(directories[&addrs[1]].contains(origin)); // B, 1 hop
        assert!(directories[&addrs[2]].contains(origin)); // C, 2 hops
        assert!(directories[&addrs[3]].contains(origin)); // D, 3 hops
        assert!(!directories[&addrs[4]].contains(origin)); // E, 4 hops
    }
}
