//! Caller identity: the account-less user identifier and the caller IP.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// Builds the identifier the client sends: lower-cased email, `_`, trimmed phone.
pub fn derive_identifier(email: &str, phone: &str) -> String {
    format!("{}_{}", email.trim().to_lowercase(), phone.trim())
}

/// One-way, deterministic key for an identifier. The raw identifier never
/// reaches the store.
pub fn hash_identifier(salt: &str, identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(identifier.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Prefix of a hashed identifier, for log lines.
pub fn log_tag(hashed_identifier: &str) -> &str {
    &hashed_identifier[..hashed_identifier.len().min(12)]
}

/// Caller IP from `x-forwarded-for`. Falls back to a shared `anonymous` bucket.
///
/// `trusted_hops` is the number of proxies in front of the server that
/// append to the header. With `0` the first entry is used, which is only
/// sound when the edge replaces the header rather than appending to it:
/// otherwise the client picks its own rate-limit bucket. With `n > 0` the
/// `n`-th entry from the right is used, the address the outermost trusted
/// proxy saw.
pub fn client_ip(headers: &HeaderMap, trusted_hops: usize) -> String {
    let entries: Vec<&str> = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').map(str::trim).collect())
        .unwrap_or_default();

    let picked = match trusted_hops {
        0 => entries.first(),
        n => entries.iter().rev().nth(n - 1).or(entries.first()),
    };

    picked
        .copied()
        .filter(|ip| !ip.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}
