use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_NODE_ADDR: &str = "127.0.0.1:8000";
static DEFAULT_BOOTSTRAP_ADDR: &str = "127.0.0.1:8000";

const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
const BOOTSTRAP_ADDRESS_KEY: &str = "BOOTSTRAP_ADDRESS";
const EVICT_UNREACHABLE_KEY: &str = "EVICT_UNREACHABLE";

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

        let bootstrap_addr = env::var(BOOTSTRAP_ADDRESS_KEY)
            .unwrap_or_else(|_| String::from(DEFAULT_BOOTSTRAP_ADDR));
        map.insert(String::from(BOOTSTRAP_ADDRESS_KEY), bootstrap_addr);

        if let Ok(evict) = env::var(EVICT_UNREACHABLE_KEY) {
            map.insert(String::from(EVICT_UNREACHABLE_KEY), evict);
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

    pub fn get_bootstrap_addr(&self) -> String {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(BOOTSTRAP_ADDRESS_KEY)
            .expect("Bootstrap address should always be present in config")
            .clone()
    }

    pub fn set_bootstrap_addr(&self, addr: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on config - this should never happen");
        inner.insert(String::from(BOOTSTRAP_ADDRESS_KEY), addr);
    }

    /// Whether the sync loop evicts a peer after a failed status query.
    /// Off by default; a single unreachable tick is weak evidence of
    /// permanent departure.
    pub fn evict_unreachable(&self) -> bool {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(EVICT_UNREACHABLE_KEY)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }

    pub fn set_evict_unreachable(&self, evict: bool) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on config - this should never happen");
        inner.insert(String::from(EVICT_UNREACHABLE_KEY), evict.to_string());
    }
}
