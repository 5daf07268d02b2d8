use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_NODE_ADDR: &str = "127.0.0.1:8001";
const DEFAULT_DIFFICULTY: usize = 2;
const DEFAULT_GOSSIP_TTL: u32 = 3;

const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
const DIFFICULTY_KEY: &str = "DIFFICULTY";
const GOSSIP_TTL_KEY: &str = "GOSSIP_TTL";

/// Node configuration sourced from environment variables.
pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let mut map = HashMap::new();

        let node_addr =
            env::var(NODE_ADDRESS_KEY).unwrap_or_else(|_| String::from(DEFAULT_NODE_ADDR));
        map.insert(String::from(NODE_ADDRESS_KEY), node_addr);

        if let Ok(difficulty) = env::var(DIFFICULTY_KEY) {
            map.insert(String::from(DIFFICULTY_KEY), difficulty);
        }
        if let Ok(ttl) = env::var(GOSSIP_TTL_KEY) {
            map.insert(String::from(GOSSIP_TTL_KEY), ttl);
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    pub fn get_node_addr(&self) -> String {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(NODE_ADDRESS_KEY)
            .expect("Node address should always be present in config")
            .clone()
    }

    pub fn set_node_addr(&self, addr: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on config - this should never happen");
        inner.insert(String::from(NODE_ADDRESS_KEY), addr);
    }

    /// Leading zero hex characters a valid proof must carry.
    pub fn get_difficulty(&self) -> usize {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(DIFFICULTY_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DIFFICULTY)
    }

    /// Propagation depth for the peer-address gossip flood.
    pub fn get_gossip_ttl(&self) -> u32 {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(GOSSIP_TTL_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_GOSSIP_TTL)
    }
}
