use ring::digest::{Context, SHA256};

use crate::error::{LedgerError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as unix seconds, the granularity block headers carry.
pub fn current_timestamp() -> Result<u64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Io(format!("System time error: {e}")))?;

    Ok(duration.as_secs())
}

pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();

    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_ref());
    out
}
