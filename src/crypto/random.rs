//! Entropy access and the random disguise identity.
//!
//! Key material comes from the OS entropy source only; if that fails the
//! caller gets a typed error and the handshake attempt is abandoned. The
//! disguise hostname tolerates a degraded path: when OS entropy is
//! unavailable it falls back to a time-seeded generator, scoped to the one
//! draw that needed it. The fallback is logged and must never feed keys.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng};

use crate::error::{Error, Result};

/// Top-level domains the random hostname draws from, chosen to blend in
/// with ordinary traffic.
const TOP_LEVEL_DOMAINS: &[&str] = &[
    "com", "net", "org", "it", "fr", "me", "ru", "cn", "es", "tr", "top", "xyz", "info",
];

/// Fill a fixed-size array from the OS entropy source.
///
/// Used for key material; there is deliberately no fallback here.
pub fn secure_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| Error::crypto(format!("os entropy source unavailable: {e}")))?;
    Ok(buf)
}

/// One random u64, preferring OS entropy with a time-seeded fallback.
///
/// The fallback generator is constructed per call and discarded; it exists
/// for portability, not security, and its use is logged at debug severity.
fn best_effort_u64() -> u64 {
    let mut buf = [0u8; 8];
    match OsRng.try_fill_bytes(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            tracing::debug!("os entropy source unavailable, using time-seeded fallback: {e}");
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default();
            SmallRng::seed_from_u64(seed).next_u64()
        }
    }
}

/// Bounded random integer in `[0, n)`.
fn best_effort_below(n: usize) -> usize {
    (best_effort_u64() % n as u64) as usize
}

/// A syntactically plausible hostname to disguise as: a lowercase
/// alphabetic label of 3 to 12 characters under a common TLD.
pub fn plausible_hostname() -> String {
    let len = 3 + best_effort_below(10);
    let mut name = String::with_capacity(len + 5);
    for _ in 0..len {
        name.push((b'a' + best_effort_below(26) as u8) as char);
    }
    name.push('.');
    name.push_str(TOP_LEVEL_DOMAINS[best_effort_below(TOP_LEVEL_DOMAINS.len())]);
    name
}
