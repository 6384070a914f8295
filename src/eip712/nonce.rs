//! Per-signature nonces and expirations.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

/// Default lifetime of a signature when no expiration is given.
pub const SIGNATURE_TTL_SECS: i64 = 10 * 60;

/// Random `len`-byte value as `0x`-prefixed hex (`2 * len + 2` chars).
///
/// Regenerates until the rendered value has the expected length, so a
/// short value is never returned.
pub fn gen_nonce(len: usize) -> String {
    let expected = len * 2 + 2;
    let mut bytes = vec![0u8; len];
    loop {
        rand::thread_rng().fill_bytes(&mut bytes);
        let value = format!("0x{}", hex::encode(&bytes));
        if value.len() == expected {
            return value;
        }
    }
}

/// Fresh 32-byte nonce for agreements.
pub fn agreement_nonce() -> String {
    gen_nonce(32)
}

/// Unix timestamp in seconds, as a decimal string.
///
/// Defaults to now + [`SIGNATURE_TTL_SECS`].
pub fn signature_expires_at(at: Option<DateTime<Utc>>) -> String {
    let at = at.unwrap_or_else(|| Utc::now() + Duration::seconds(SIGNATURE_TTL_SECS));
    at.timestamp().to_string()
}
