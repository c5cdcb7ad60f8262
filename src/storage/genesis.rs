use crate::core::Account;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default manifest written when a data dir is provisioned from scratch.
const DEFAULT_GENESIS_JSON: &str = r#"{
    "balances": {
        "treasury": 1000000
    }
}
"#;

/// The initial balance table seeding the ledger before any blocks exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genesis {
    pub balances: HashMap<Account, u64>,
}

impl Genesis {
    /// Load the genesis manifest from disk. Unknown top-level fields such as
    /// a chain id or genesis time are tolerated and ignored.
    pub fn load(path: &Path) -> Result<Genesis> {
        let content = fs::read_to_string(path)?;
        let genesis: Genesis = serde_json::from_str(&content)?;
        Ok(genesis)
    }

    pub fn total_supply(&self) -> u64 {
        self.balances.values().sum()
    }
}

pub fn write_default_genesis(path: &Path) -> Result<()> {
    fs::write(path, DEFAULT_GENESIS_JSON)?;
    Ok(())
}
