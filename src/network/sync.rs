use crate::core::State;
use crate::error::{LedgerError, Result};
use crate::network::node::{PeerRegistry, StatusView};
use crate::network::server::{Request, Response};
use log::{error, info, warn};
use serde_json::Deserializer;
use std::io::BufReader;
use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Reference gossip interval.
const SYNC_INTERVAL_SECS: u64 = 45;
/// Per-peer connect/read/write bound so one dead peer cannot stall a tick.
const PEER_TIMEOUT_MILLIS: u64 = 5000;

/// Tunables of the gossip loop. Eviction of unreachable peers is a policy
/// choice, not a hard rule: one failed status query is weak evidence of
/// permanent departure, so the default keeps the peer.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    pub interval: Duration,
    pub peer_timeout: Duration,
    pub evict_unreachable: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy {
            interval: Duration::from_secs(SYNC_INTERVAL_SECS),
            peer_timeout: Duration::from_millis(PEER_TIMEOUT_MILLIS),
            evict_unreachable: false,
        }
    }
}

/// Background task that periodically polls every known peer for its status,
/// merges newly discovered peers into the registry and logs height
/// divergence. Fetching the missing blocks themselves is out of scope.
pub struct SyncLoop {
    state: Arc<Mutex<State>>,
    peers: Arc<PeerRegistry>,
    self_addr: String,
    policy: SyncPolicy,
}

/// Handle to a running sync loop; dropping it without calling
/// [`SyncHandle::shutdown`] also stops the loop at its next tick boundary,
/// via the disconnected channel.
pub struct SyncHandle {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl SyncHandle {
    /// Signal cancellation and wait for the loop to exit. The signal is
    /// observed between ticks, so no tick is left in flight afterwards.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.join();
    }
}

impl SyncLoop {
    pub fn new(
        state: Arc<Mutex<State>>,
        peers: Arc<PeerRegistry>,
        self_addr: String,
        policy: SyncPolicy,
    ) -> SyncLoop {
        SyncLoop {
            state,
            peers,
            self_addr,
            policy,
        }
    }

    /// Run the loop on its own thread. Waiting on the shutdown channel with
    /// a timeout is both the tick timer and the cancellation check, and a
    /// single thread running ticks back to back means two ticks can never
    /// overlap.
    pub fn spawn(self) -> SyncHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let handle = thread::spawn(move || self.run(shutdown_rx));

        SyncHandle {
            shutdown_tx,
            handle,
        }
    }

    fn run(self, shutdown_rx: Receiver<()>) {
        info!(
            "Sync loop started (interval {:?}, evict_unreachable={})",
            self.policy.interval, self.policy.evict_unreachable
        );

        loop {
            match shutdown_rx.recv_timeout(self.policy.interval) {
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    info!("Sync loop stopped");
                    return;
                }
            }
        }
    }

    /// One polling pass over a snapshot of the registry.
    pub fn tick(&self) {
        let peers = match self.peers.snapshot() {
            Ok(peers) => peers,
            Err(e) => {
                error!("Skipping sync tick, cannot snapshot peers: {e}");
                return;
            }
        };

        info!("Polling {} known peer(s) for status", peers.len());

        for peer_key in peers.keys() {
            if *peer_key == self.self_addr {
                continue;
            }

            match query_peer_status(peer_key, self.policy.peer_timeout) {
                Ok(status) => self.absorb_status(peer_key, status),
                Err(e) => {
                    warn!("Peer {peer_key} unreachable: {e}");
                    if self.policy.evict_unreachable {
                        info!("Evicting unreachable peer {peer_key}");
                        if let Err(e) = self.peers.remove(peer_key) {
                            error!("Failed to remove peer {peer_key}: {e}");
                        }
                    }
                }
            }
        }
    }

    fn absorb_status(&self, peer_key: &str, status: StatusView) {
        let local_height = match self.state.lock() {
            Ok(state) => state.latest_block().header.height,
            Err(e) => {
                error!("Cannot read local height: {e}");
                return;
            }
        };

        if status.block_height > local_height {
            info!(
                "Peer {peer_key} is {} block(s) ahead (local height {local_height}, remote {})",
                status.block_height - local_height,
                status.block_height
            );
        }

        for (key, peer) in status.known_peers {
            if key == self.self_addr {
                continue;
            }
            match self.peers.merge(peer) {
                Ok(true) => info!("Found new peer {key}"),
                Ok(false) => {}
                Err(e) => error!("Failed to merge peer {key}: {e}"),
            }
        }
    }
}

/// Blocking status query against one peer, bounded by `timeout` on connect,
/// read and write.
pub fn query_peer_status(peer_addr: &str, timeout: Duration) -> Result<StatusView> {
    let socket_addr = peer_addr
        .parse::<SocketAddr>()
        .map_err(|e| LedgerError::Network(format!("Invalid peer address {peer_addr}: {e}")))?;

    let stream = TcpStream::connect_timeout(&socket_addr, timeout)
        .map_err(|e| LedgerError::Network(format!("Failed to connect to {peer_addr}: {e}")))?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))?;
    stream
        .set_write_timeout(Some(timeout))
        .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;

    serde_json::to_writer(&stream, &Request::Status)
        .map_err(|e| LedgerError::Network(format!("Failed to send status request: {e}")))?;

    let reader = BufReader::new(&stream);
    match Deserializer::from_reader(reader).into_iter::<Response>().next() {
        Some(Ok(Response::Status(status))) => Ok(status),
        Some(Ok(Response::Error { error })) => Err(LedgerError::Network(format!(
            "Peer {peer_addr} answered with error: {error}"
        ))),
        Some(Ok(_)) => Err(LedgerError::Network(format!(
            "Unexpected response kind from {peer_addr}"
        ))),
        Some(Err(e)) => Err(LedgerError::Network(format!(
            "Failed to read status response from {peer_addr}: {e}"
        ))),
        None => Err(LedgerError::Network(format!(
            "Peer {peer_addr} closed the connection without responding"
        ))),
    }
}
