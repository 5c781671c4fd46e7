//! HTTP Endpoints
//!
//! REST API over dialogue sessions.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use voice_assistant_text_processing::strip_code_blocks;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config.server.cors_origins, state.config.server.cors_enabled);

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/reset", post(reset_session))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return cors.allow_origin(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    cors.allow_origin(parsed_origins)
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: String,
}

/// Create session
async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ServerError> {
    let session = state.sessions.create()?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id.clone(),
        }),
    ))
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = state.sessions.get(&id).ok_or(ServerError::SessionNotFound(id))?;
    let age_secs = session.age().as_secs();
    let dialogue = session.lock().await;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "turn_count": dialogue.turn_count(),
        "state": dialogue.state().name(),
        "age_secs": age_secs,
    })))
}

/// Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::SessionNotFound(id))
    }
}

/// Reset session
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let session = state.sessions.get(&id).ok_or(ServerError::SessionNotFound(id))?;
    session.lock().await.reset();
    Ok(StatusCode::NO_CONTENT)
}

/// Message request
#[derive(Debug, Deserialize)]
struct MessageRequest {
    message: String,
}

/// Message response
#[derive(Debug, Serialize)]
struct MessageResponse {
    /// Full assistant reply
    response: String,
    /// Reply with code blocks removed, for speech output
    spoken: String,
    finished: bool,
}

/// Process one utterance
async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    let session = state.sessions.get(&id).ok_or(ServerError::SessionNotFound(id))?;

    let utterance = request.message.trim();
    if utterance.is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".to_string()));
    }

    let result = session.lock().await.process(utterance).await;

    let spoken = strip_code_blocks(&result.text);
    for block in &spoken.code_blocks {
        tracing::info!(session_id = %session.id, "Code block not spoken:\n{}", block);
    }

    Ok(Json(MessageResponse {
        response: result.text,
        spoken: spoken.spoken,
        finished: result.finished,
    }))
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model_name(),
        "sessions": state.sessions.count(),
    }))
}

