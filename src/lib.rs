//! # Ledger Node
//!
//! A minimal single-writer ledger node: an account-balance table derived
//! from a hash-chained, append-only block log, plus a gossip loop that
//! periodically exchanges height and peer-set information with other nodes.
//!
//! ## How the code is organized
//! - `core/`: accounts, transactions, hash-chained blocks and the state
//!   engine that validates and applies them
//! - `storage/`: the data-dir layout, genesis manifest and the append-only
//!   block log that is the sole durable state
//! - `network/`: peer registry, the node's functional contract, the status
//!   responder and the background sync loop
//! - `config/`: node settings (listen address, bootstrap peer, eviction
//!   policy)
//! - `cli/`: command-line interface
//! - `utils/`: hashing and time helpers
//!
//! The chain carries no proof-of-work and no fork choice; all validation is
//! balance checks plus strict height/parent continuity, and the block log's
//! file order is the canonical chain order used for replay.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use core::{Account, Block, BlockHeader, BlockRecord, Hash, State, Transaction};
pub use error::{LedgerError, Result};
pub use network::{
    BalancesView, Node, PeerNode, PeerRegistry, StatusView, SyncHandle, SyncLoop, SyncPolicy,
};
pub use storage::Genesis;
