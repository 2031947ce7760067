//! # memchain-primitives
//!
//! Primitive building blocks shared by every MemChain crate:
//!
//! - [`canonical`]: deterministic JSON text used as hash input
//! - [`clock`]: epoch-microsecond clocks (system, manual)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod clock;

pub use canonical::{canonical_json, to_canonical_json};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock, MICROS_PER_MILLI};

/// Ordered-key JSON object used for transaction payloads and contract params
pub type DataMap = serde_json::Map<String, serde_json::Value>;
