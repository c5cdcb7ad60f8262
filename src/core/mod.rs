//! Core ledger functionality
//!
//! This module contains the fundamental ledger components: accounts and
//! transactions, hash-chained blocks, and the state engine that validates
//! and applies them.

pub mod block;
pub mod state;
pub mod transaction;

pub use block::{Block, BlockHeader, BlockRecord, Hash};
pub use state::State;
pub use transaction::{Account, Transaction, REWARD_DATA};
