use crate::core::Transaction;
use crate::error::{LedgerError, Result};
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 32-byte SHA-256 content digest of a block's canonical JSON encoding.
///
/// Serialized as a 64-character lowercase hex string; the zero hash is the
/// implicit parent of the first block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hash([u8; 32]);

impl Hash {
    pub fn zero() -> Hash {
        Hash([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    pub fn from_hex(hex: &str) -> Result<Hash> {
        let bytes = HEXLOWER
            .decode(hex.as_bytes())
            .map_err(|e| LedgerError::Serialization(format!("Invalid hex hash: {e}")))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LedgerError::Serialization("Hash must be 32 bytes".to_string()))?;
        Ok(Hash(array))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Hash::from_hex(&hex).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub parent: Hash,
    pub height: u64,
    pub time: u64,
}

/// An immutable batch of transactions chained to its parent by hash.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub payload: Vec<Transaction>,
}

impl Block {
    /// Pure constructor; no I/O.
    pub fn new(parent: Hash, height: u64, time: u64, payload: Vec<Transaction>) -> Block {
        Block {
            header: BlockHeader {
                parent,
                height,
                time,
            },
            payload,
        }
    }

    /// Content hash over the canonical JSON encoding of header and payload.
    ///
    /// Struct fields and the transaction sequence serialize in a fixed
    /// order, so identical content always hashes identically.
    pub fn hash(&self) -> Result<Hash> {
        let encoded = serde_json::to_vec(self)?;
        Ok(Hash(sha256_digest(&encoded)))
    }
}

/// Persisted form of a block: the log binds each block to its content hash
/// so a reader can detect corruption during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(rename = "hash")]
    pub key: Hash,
    #[serde(rename = "block")]
    pub value: Block,
}

impl BlockRecord {
    pub fn new(key: Hash, value: Block) -> BlockRecord {
        BlockRecord { key, value }
    }
}
