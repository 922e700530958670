//! # Canonical Serialization
//!
//! Deterministic JSON for hashing and audit snapshots.
//!
//! Canonical form is compact JSON with object keys sorted recursively.
//! Decimals serialize as strings, so `1.420` and `1.42` stay distinct and
//! no value passes through binary floating point.
//!
//! Content hashes are BLAKE3 over [`HASH_DOMAIN`] followed by the canonical
//! bytes, rendered as 64 lowercase hex characters.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::PressfitError;

/// Domain separator prepended to every hashed payload.
pub const HASH_DOMAIN: &[u8] = b"pressfit:audit:v1\0";

/// Length of a hex-encoded content hash.
pub const HASH_HEX_LEN: usize = 64;

/// Rebuild `value` with every object's keys in sorted order.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                if let Some(inner) = map.get(key) {
                    sorted.insert(key.clone(), canonicalize(inner));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serialize `value` to canonical JSON text.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, PressfitError> {
    let tree =
        serde_json::to_value(value).map_err(|e| PressfitError::Serialization(e.to_string()))?;
    serde_json::to_string(&canonicalize(&tree))
        .map_err(|e| PressfitError::Serialization(e.to_string()))
}

/// Domain-separated BLAKE3 hash of the canonical form of `value`.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, PressfitError> {
    let canonical = to_canonical_json(value)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(HASH_DOMAIN);
    hasher.update(canonical.as_bytes());
    Ok(hasher.finalize().to_hex().to_string())
}
