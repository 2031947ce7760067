//! HTTP server implementation

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::error::{JsonRpcError, RpcResult};
use crate::handler::RpcHandler;
use crate::types::{JsonRpcId, JsonRpcRequest, JsonRpcResponse};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,
    /// Maximum request body size (default: 10MB)
    pub max_body_size: usize,
    /// Request timeout (default: 30s)
    pub request_timeout: Duration,
    /// Enable CORS (default: true)
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8545)),
            max_body_size: 10 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with the given address
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }
}

/// RPC server state
pub struct ServerState {
    /// RPC handler for processing requests
    pub handler: RpcHandler,
}

/// RPC HTTP server
pub struct RpcServer {
    config: ServerConfig,
    state: Arc<ServerState>,
}

impl RpcServer {
    /// Create a new RPC server
    pub fn new(config: ServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            state: Arc::new(ServerState { handler }),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let mut router = Router::new().route("/", post(handle_rpc)).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(self.config.max_body_size)),
        );

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router.with_state(self.state.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> RpcResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let listener = TcpListener::bind(self.config.listen_addr).await?;
        tracing::info!("RPC server listening on {}", self.config.listen_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("RPC server stopped");
        Ok(())
    }

    /// Get the server listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.config.listen_addr
    }
}

/// Handle JSON-RPC requests
///
/// The body is taken raw so malformed JSON and non-request objects can be
/// answered with JSON-RPC errors instead of HTTP rejections.
async fn handle_rpc(State(state): State<Arc<ServerState>>, body: String) -> Json<JsonRpcResponse> {
    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => {
            return Json(JsonRpcResponse::error(JsonRpcId::Null, JsonRpcError::parse_error()));
        }
    };

    let id = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok())
        .unwrap_or_default();

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Json(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(e.to_string()),
            ));
        }
    };

    Json(state.handler.handle_request(request).await)
}
