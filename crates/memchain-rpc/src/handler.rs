//! Request handler and method dispatcher

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use memchain_core::SharedChain;
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::methods::{blockchain, consensus, contract};
use crate::types::{JsonRpcRequest, JsonRpcResponse};

/// Type alias for async method handler
pub type MethodFn = Box<
    dyn Fn(Arc<RpcContext>, Vec<Value>) -> Pin<Box<dyn Future<Output = Result<Value, JsonRpcError>> + Send>>
        + Send
        + Sync,
>;

/// Shared context for RPC handlers
pub struct RpcContext {
    /// The node's chain
    pub chain: SharedChain,
}

impl RpcContext {
    /// Create a new RPC context
    pub fn new(chain: SharedChain) -> Self {
        Self { chain }
    }
}

/// Method registry for dispatching RPC calls
pub struct MethodRegistry {
    methods: HashMap<String, MethodFn>,
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodRegistry {
    /// Create a new method registry with all methods registered
    pub fn new() -> Self {
        let mut registry = Self {
            methods: HashMap::new(),
        };

        // blockchain_*
        registry.register("blockchain_getInfo", blockchain::blockchain_get_info);
        registry.register("blockchain_getBlock", blockchain::blockchain_get_block);
        registry.register("blockchain_getTransaction", blockchain::blockchain_get_transaction);
        registry.register("blockchain_submitTransaction", blockchain::blockchain_submit_transaction);
        registry.register("blockchain_getAuditTrail", blockchain::blockchain_get_audit_trail);
        registry.register("blockchain_verifyIntegrity", blockchain::blockchain_verify_integrity);

        // consensus_*
        registry.register("consensus_getStatus", consensus::consensus_get_status);

        // contract_*
        registry.register("contract_execute", contract::contract_execute);
        registry.register("contract_getState", contract::contract_get_state);

        registry
    }

    /// Register a method handler
    pub fn register<F, Fut>(&mut self, name: &str, handler: F)
    where
        F: Fn(Arc<RpcContext>, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, JsonRpcError>> + Send + 'static,
    {
        self.methods.insert(
            name.to_string(),
            Box::new(move |ctx, params| Box::pin(handler(ctx, params))),
        );
    }

    /// Dispatch a method call
    pub async fn dispatch(
        &self,
        ctx: Arc<RpcContext>,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, JsonRpcError> {
        match self.methods.get(method) {
            Some(handler) => handler(ctx, params).await,
            None => Err(JsonRpcError::method_not_found(method)),
        }
    }

    /// Check if a method is registered
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Get list of registered methods
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(|s| s.as_str()).collect()
    }
}

/// RPC request handler
pub struct RpcHandler {
    ctx: Arc<RpcContext>,
    registry: MethodRegistry,
}

impl RpcHandler {
    /// Create a new RPC handler
    pub fn new(ctx: Arc<RpcContext>) -> Self {
        Self {
            ctx,
            registry: MethodRegistry::new(),
        }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("invalid JSON-RPC version"),
            );
        }

        tracing::debug!("RPC call {}", request.method);
        match self
            .registry
            .dispatch(self.ctx.clone(), &request.method, request.params)
            .await
        {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(error) => {
                tracing::debug!("RPC call {} failed: {}", request.method, error.message);
                JsonRpcResponse::error(request.id, error)
            }
        }
    }

    /// Get the RPC context
    pub fn context(&self) -> &Arc<RpcContext> {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METHODS: [&str; 9] = [
        "blockchain_getInfo",
        "blockchain_getBlock",
        "blockchain_getTransaction",
        "blockchain_submitTransaction",
        "blockchain_getAuditTrail",
        "blockchain_verifyIntegrity",
        "consensus_getStatus",
        "contract_execute",
        "contract_getState",
    ];

    #[test]
    fn test_method_registry_all_methods() {
        let registry = MethodRegistry::new();
        for method in ALL_METHODS {
            assert!(registry.has_method(method), "Missing method: {}", method);
        }
        assert!(!registry.has_method("eth_chainId"));
        assert_eq!(registry.method_names().len(), ALL_METHODS.len());
    }

    #[test]
    fn test_method_registry_custom_handler() {
        let mut registry = MethodRegistry::default();

        async fn custom_handler(
            _ctx: Arc<RpcContext>,
            _params: Vec<Value>,
        ) -> Result<Value, JsonRpcError> {
            Ok(Value::String("custom".to_string()))
        }

        registry.register("custom_method", custom_handler);
        assert!(registry.has_method("custom_method"));
    }
}
