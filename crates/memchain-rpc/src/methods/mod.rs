//! RPC method implementations, one module per namespace

pub mod blockchain;
pub mod consensus;
pub mod contract;
