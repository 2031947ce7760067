//! Pairwise SHA-256 Merkle fold over hex hashes

use memchain_crypto::sha256_hex;

/// Pre-image hashed for a block with no transactions
pub const EMPTY_MERKLE_SEED: &[u8] = b"empty";

/// Fold a list of hex hashes into a single root.
///
/// Each level hashes the concatenated hex text of adjacent pairs; an odd
/// level duplicates its last element first. An empty list yields
/// `sha256("empty")`.
pub fn merkle_root<S: AsRef<str>>(hashes: &[S]) -> String {
    if hashes.is_empty() {
        return sha256_hex(EMPTY_MERKLE_SEED);
    }

    let mut level: Vec<String> = hashes.iter().map(|h| h.as_ref().to_string()).collect();
    while level.len() > 1 {
        if level.len() % 2 != 0 {
            if let Some(last) = level.last().cloned() {
                level.push(last);
            }
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut combined = String::with_capacity(pair[0].len() + pair[1].len());
                combined.push_str(&pair[0]);
                combined.push_str(&pair[1]);
                sha256_hex(combined.as_bytes())
            })
            .collect();
    }
    level.swap_remove(0)
}
