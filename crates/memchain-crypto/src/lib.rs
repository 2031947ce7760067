//! # memchain-crypto
//!
//! Cryptographic primitives for MemChain.
//!
//! - SHA-256 hashing with lowercase hex output
//! - Placeholder transaction signatures (`sha256(data_hash || key)`)
//!
//! The signature scheme is a stand-in that only proves possession of a
//! shared string; it provides no asymmetric-key security.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;
mod signature;

pub use hash::{sha256, sha256_hex, short_hash, HASH_HEX_LEN, ZERO_HASH_HEX};
pub use signature::{sign, verify_signature};
