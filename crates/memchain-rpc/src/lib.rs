//! # memchain-rpc
//!
//! JSON-RPC 2.0 server for a MemChain node.
//!
//! Requests are POSTed to `/` with positional params. Every method runs
//! against the node's [`memchain_core::SharedChain`]; mutating methods take
//! the write lock, queries take the read lock.
//!
//! ## Usage
//!
//! ```ignore
//! use memchain_rpc::{RpcContext, RpcHandler, RpcServer, ServerConfig};
//! use std::sync::Arc;
//!
//! let ctx = Arc::new(RpcContext::new(chain.clone()));
//! let server = RpcServer::new(ServerConfig::default(), RpcHandler::new(ctx));
//! server.run(shutdown_signal).await?;
//! ```
//!
//! ## Supported Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | `blockchain_getInfo` | Chain length, transaction counts, head block |
//! | `blockchain_getBlock` | Block by index |
//! | `blockchain_getTransaction` | Transaction by id, pending or sealed |
//! | `blockchain_submitTransaction` | Queue an operation for the next block |
//! | `blockchain_getAuditTrail` | Filtered sealed transactions |
//! | `blockchain_verifyIntegrity` | Walk and re-hash the whole chain |
//! | `consensus_getStatus` | Validator set and current turn |
//! | `contract_execute` | Run a contract function and record it |
//! | `contract_getState` | Snapshot of a contract's state |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod handler;
pub mod methods;
pub mod server;
pub mod types;

// Re-export main types
pub use error::{error_code, JsonRpcError, RpcError, RpcResult};
pub use handler::{MethodRegistry, RpcContext, RpcHandler};
pub use server::{RpcServer, ServerConfig};
pub use types::{
    ContractCallRequest, JsonRpcId, JsonRpcRequest, JsonRpcResponse, SubmitTransactionRequest,
};
