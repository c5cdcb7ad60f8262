use crate::config::GLOBAL_CONFIG;
use crate::core::{Account, Hash, State, Transaction};
use crate::error::{LedgerError, Result};
use crate::network::server;
use crate::network::sync::{SyncLoop, SyncPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// A remote node we know about, keyed in the registry by `"ip:port"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerNode {
    pub ip: String,
    pub port: u16,
    pub is_bootstrap: bool,
    pub is_active: bool,
}

impl PeerNode {
    pub fn new(ip: impl Into<String>, port: u16, is_bootstrap: bool, is_active: bool) -> PeerNode {
        PeerNode {
            ip: ip.into(),
            port,
            is_bootstrap,
            is_active,
        }
    }

    /// Parse an `"ip:port"` string into a peer entry.
    pub fn from_addr(addr: &str, is_bootstrap: bool) -> Result<PeerNode> {
        let (ip, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| LedgerError::Config(format!("Invalid peer address: {addr}")))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| LedgerError::Config(format!("Invalid peer port in {addr}: {e}")))?;
        Ok(PeerNode::new(ip, port, is_bootstrap, false))
    }

    /// Registry identity key.
    pub fn tcp_address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

/// The set of known remote nodes, guarded by its own lock so the sync loop
/// and request handlers can mutate it independently of the state engine.
pub struct PeerRegistry {
    inner: RwLock<HashMap<String, PeerNode>>,
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerRegistry {
    pub fn new() -> PeerRegistry {
        PeerRegistry {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Insert the bootstrap peer a node starts from.
    pub fn seed(&self, bootstrap: PeerNode) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| LedgerError::Network(format!("Failed to acquire peer lock: {e}")))?;
        inner.insert(bootstrap.tcp_address(), bootstrap);
        Ok(())
    }

    /// Insert a discovered peer; a no-op if the key is already present so
    /// existing `is_active`/`is_bootstrap` flags are never overwritten.
    /// Returns whether the peer was newly inserted.
    pub fn merge(&self, peer: PeerNode) -> Result<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| LedgerError::Network(format!("Failed to acquire peer lock: {e}")))?;
        let key = peer.tcp_address();
        if inner.contains_key(&key) {
            return Ok(false);
        }
        inner.insert(key, peer);
        Ok(true)
    }

    pub fn remove(&self, peer_key: &str) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| LedgerError::Network(format!("Failed to acquire peer lock: {e}")))?;
        inner.remove(peer_key);
        Ok(())
    }

    /// Read-only copy of all known peers.
    pub fn snapshot(&self) -> Result<HashMap<String, PeerNode>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| LedgerError::Network(format!("Failed to acquire peer lock: {e}")))?;
        Ok(inner.clone())
    }

    pub fn contains(&self, peer_key: &str) -> Result<bool> {
        let inner = self
            .inner
            .read()
            .map_err(|e| LedgerError::Network(format!("Failed to acquire peer lock: {e}")))?;
        Ok(inner.contains_key(peer_key))
    }

    pub fn len(&self) -> Result<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|e| LedgerError::Network(format!("Failed to acquire peer lock: {e}")))?;
        Ok(inner.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Answer to a balances query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesView {
    pub block_hash: Hash,
    pub balances: HashMap<Account, u64>,
}

/// Answer to a status query; what peers exchange each gossip tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusView {
    pub block_hash: Hash,
    pub block_height: u64,
    pub known_peers: HashMap<String, PeerNode>,
}

/// A running ledger node: the state engine behind its exclusion boundary
/// plus the peer registry, exposing the narrow functional contract the
/// transport layers consume.
#[derive(Clone)]
pub struct Node {
    state: Arc<Mutex<State>>,
    peers: Arc<PeerRegistry>,
    addr: String,
}

impl Node {
    pub fn new(state: State, addr: String, bootstrap: PeerNode) -> Result<Node> {
        let peers = PeerRegistry::new();
        peers.seed(bootstrap)?;

        Ok(Node {
            state: Arc::new(Mutex::new(state)),
            peers: Arc::new(peers),
            addr,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn state(&self) -> Arc<Mutex<State>> {
        Arc::clone(&self.state)
    }

    pub fn peers(&self) -> Arc<PeerRegistry> {
        Arc::clone(&self.peers)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| LedgerError::Io(format!("Failed to acquire state lock: {e}")))
    }

    pub fn balances(&self) -> Result<BalancesView> {
        let state = self.lock_state()?;
        Ok(BalancesView {
            block_hash: state.latest_block_hash(),
            balances: state.balances().clone(),
        })
    }

    pub fn status(&self) -> Result<StatusView> {
        let state = self.lock_state()?;
        Ok(StatusView {
            block_hash: state.latest_block_hash(),
            block_height: state.latest_block().header.height,
            known_peers: self.peers.snapshot()?,
        })
    }

    /// Validate and apply a transaction, then immediately persist the
    /// mempool as a new block. The state lock is held across the whole
    /// sequence so no other submission interleaves with it.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<Hash> {
        let mut state = self.lock_state()?;
        state.add_tx(tx)?;
        state.persist()
    }

    /// Start the node: spawn the gossip loop, then serve status queries on
    /// the node's address until the listener fails.
    pub fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .map_err(|e| LedgerError::Network(format!("Failed to bind to {}: {e}", self.addr)))?;

        let policy = SyncPolicy {
            evict_unreachable: GLOBAL_CONFIG.evict_unreachable(),
            ..SyncPolicy::default()
        };
        let sync_handle =
            SyncLoop::new(self.state(), self.peers(), self.addr.clone(), policy).spawn();

        let result = server::serve(listener, self.clone());
        sync_handle.shutdown();
        result
    }
}
