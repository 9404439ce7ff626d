//! API routes for breadcrumbs

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use breadcrumbs_core::{log_debug, ServiceStats, ToolDefinition, ToolOutput};

use crate::error::ApiError;
use crate::server::AppState;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Health
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/api/v1/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub tools_available: usize,
    pub model: String,
    pub stats: ServiceStats,
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let door = &state.front_door;
    let adapter = door.orchestrator().adapter();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: door.uptime().as_secs(),
        tools_available: door.orchestrator().registry().tool_count(),
        model: format!("{}/{}", adapter.name(), adapter.model()),
        stats: door.stats(),
    })
}

// ============================================================================
// Tools
// ============================================================================

pub fn tool_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/v1/tools", get(list_tools))
        .route("/api/v1/tools/:name/execute", post(execute_tool))
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

async fn list_tools(State(state): State<AppStateArc>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.front_door.tools(),
    })
}

/// Body is the argument object; an empty body means no arguments
async fn execute_tool(
    State(state): State<AppStateArc>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolOutput>, ApiError> {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_input(format!("body is not valid JSON: {}", e)))?
    };
    log_debug!(state.logger, "[Server] Direct execution of {}", name);

    let output = state.front_door.execute_tool(&name, arguments).await?;
    Ok(Json(output))
}

// ============================================================================
// Chat
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/api/v1/chat", post(chat))
}

fn default_tools_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default = "default_tools_enabled")]
    pub tools_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    pub timestamp: DateTime<Utc>,
    pub tools_used: Vec<String>,
}

async fn chat(
    State(state): State<AppStateArc>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_input(e.body_text()))?;

    let reply = state
        .front_door
        .handle(&request.message, request.tools_enabled, None, request.conversation_id)
        .await?;

    Ok(Json(ChatResponse {
        response: reply.answer,
        conversation_id: reply.conversation_id,
        timestamp: reply.timestamp,
        tools_used: reply.tools_used,
    }))
}
