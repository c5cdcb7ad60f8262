//! Configuration management
//!
//! This module handles the node's runtime settings: the local listen
//! address, the bootstrap peer and the sync loop's eviction policy.

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
