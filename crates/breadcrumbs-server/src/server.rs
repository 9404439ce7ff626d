//! HTTP server for breadcrumbs

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method},
    middleware, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use breadcrumbs_core::{log_info, log_warn, FrontDoor, Logger};

use crate::auth::require_bearer;
use crate::routes;

/// Maximum request body: 64 KiB
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub front_door: Arc<FrontDoor>,
    pub api_keys: HashSet<String>,
    pub logger: Arc<dyn Logger>,
}

impl AppState {
    pub fn new(front_door: Arc<FrontDoor>, api_keys: impl IntoIterator<Item = String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            front_door,
            api_keys: api_keys.into_iter().collect(),
            logger,
        }
    }
}

/// Build the router; health stays open, everything else needs a key
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .merge(routes::tool_routes())
        .merge(routes::chat_routes())
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), require_bearer));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .merge(routes::health_routes())
        .merge(protected)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(cors)
}

/// Run the HTTP server until the process is stopped
pub async fn run(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let state = Arc::new(state);
    if state.api_keys.is_empty() {
        log_warn!(state.logger, "[Server] No API keys configured, authentication is disabled");
    }
    let logger = Arc::clone(&state.logger);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_info!(logger, "[Server] Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
