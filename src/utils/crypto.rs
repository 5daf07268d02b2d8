use data_encoding::HEXLOWER;
use ring::digest::{Context, SHA256};

use crate::error::{NodeError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn current_timestamp() -> Result<f64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| NodeError::Crypto(format!("System time error: {e}")))?;

    Ok(duration.as_secs_f64())
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// SHA-256 digest encoded as lowercase hex, the form all block hashes use.
pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(sha256_digest(data).as_slice())
}
