//! SHA-256 hashing

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const HASH_HEX_LEN: usize = 64;

/// 64 zero characters, the `previous_hash` of a genesis block
pub const ZERO_HASH_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Compute the raw SHA-256 digest of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 and return it as lowercase hex (no `0x` prefix)
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// First `len` hex characters of the SHA-256 of `data`
pub fn short_hash(data: &[u8], len: usize) -> String {
    let mut full = sha256_hex(data);
    full.truncate(len.min(HASH_HEX_LEN));
    full
}
