use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker in a transaction's data field that makes it a minting event.
pub const REWARD_DATA: &str = "reward";

/// Opaque account identifier. No validation beyond non-empty by convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Account(String);

impl Account {
    pub fn new(value: impl Into<String>) -> Account {
        Account(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Account {
    fn from(value: &str) -> Self {
        Account::new(value)
    }
}

/// A single value transfer between two accounts.
///
/// A transaction whose `data` equals [`REWARD_DATA`] mints value into the
/// recipient without debiting the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Account,
    pub to: Account,
    pub value: u64,
    pub data: String,
}

impl Transaction {
    pub fn new(from: Account, to: Account, value: u64, data: impl Into<String>) -> Transaction {
        Transaction {
            from,
            to,
            value,
            data: data.into(),
        }
    }

    pub fn is_reward(&self) -> bool {
        self.data == REWARD_DATA
    }
}
