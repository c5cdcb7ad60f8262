//! Peer-to-peer networking functionality
//!
//! This module holds the peer registry, the node's functional contract
//! (balances, status, transaction submission), the TCP/JSON status
//! responder other nodes poll, and the background gossip loop.

pub mod node;
pub mod server;
pub mod sync;

pub use node::{BalancesView, Node, PeerNode, PeerRegistry, StatusView};
pub use server::{serve, Request, Response};
pub use sync::{query_peer_status, SyncHandle, SyncLoop, SyncPolicy};
