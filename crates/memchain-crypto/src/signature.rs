//! Placeholder transaction signatures
//!
//! A signature is `sha256(data_hash || key)` in hex. Verification recomputes
//! it with the same key, so whoever can verify can also forge.

use crate::hash::sha256_hex;

/// Sign a transaction data hash with a key string
pub fn sign(data_hash: &str, key: &str) -> String {
    let mut message = String::with_capacity(data_hash.len() + key.len());
    message.push_str(data_hash);
    message.push_str(key);
    sha256_hex(message.as_bytes())
}

/// Check a signature produced by [`sign`]
pub fn verify_signature(data_hash: &str, key: &str, signature: &str) -> bool {
    sign(data_hash, key) == signature
}
