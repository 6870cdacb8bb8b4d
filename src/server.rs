use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::handlers::{ServerState, get_stats, issue_cryptogram, root};

/// Routes of the stub server, with permissive CORS so a page served from
/// another origin can post its key.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/cryptogram", post(issue_cryptogram))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address; returns the listener and the address it
/// actually got (useful when binding port 0).
pub async fn bind(config: &ServerConfig) -> Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

/// Serve until the process is stopped.
pub async fn serve(listener: TcpListener, config: &ServerConfig) -> Result<()> {
    let state = Arc::new(ServerState::new(config.message.clone()));
    axum::serve(listener, router(state)).await?;
    Ok(())
}
