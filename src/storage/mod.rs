//! Data storage and persistence
//!
//! This module manages the on-disk layout of a node: the genesis manifest
//! that seeds the balance table and the append-only block log that is the
//! sole durable state.

pub mod fs;
pub mod genesis;
pub mod log;

pub use fs::{blocks_db_file_path, genesis_json_file_path, init_data_dir_if_not_exists};
pub use genesis::Genesis;
pub use log::{append_record, read_records};
