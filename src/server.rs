//! HTTP surface over [`WorkflowService`].
//!
//! | Method | Path | Body | Response |
//! |---|---|---|---|
//! | POST | `/infer` | [`InferenceRequest`] | [`InferenceResponse`] |
//! | GET | `/conversations/{username}` | | conversation records |
//! | GET | `/health` | | [`HealthStatus`] |
//! | GET | `/tools` | | [`ToolList`] |
//! | POST | `/tools` | [`ToolCreate`] | [`MessageResponse`] |
//! | PUT | `/tools/{name}` | [`ToolUpdate`] | [`MessageResponse`] |
//! | DELETE | `/tools/{name}` | | [`MessageResponse`] |
//!
//! The caller's identity comes from the `X-Username` header. Rejections are
//! returned as `{"detail": "..."}` with a 400 or 404 status.

use crate::config::ServerSettings;
use crate::error::WorkflowError;
use crate::memory::ConversationRecord;
use crate::service::{
    ApiError, HealthStatus, InferenceRequest, InferenceResponse, MessageResponse, ToolCreate,
    ToolList, ToolUpdate, WorkflowService,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

/// Header carrying the caller's username.
pub const USERNAME_HEADER: &str = "x-username";

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(ErrorBody {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}

/// Builds the router, with CORS restricted to `settings.cors_origins`.
pub fn router(service: WorkflowService, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/infer", post(infer))
        .route("/conversations/{username}", get(conversations))
        .route("/health", get(health))
        .route("/tools", get(list_tools).post(add_tool))
        .route("/tools/{name}", put(update_tool).delete(delete_tool))
        .with_state(service)
        .layer(cors_layer(settings))
}

fn cors_layer(settings: &ServerSettings) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if settings.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Binds `settings.bind` and serves until the process is interrupted.
///
/// # Errors
///
/// Returns a server error if the address cannot be bound or serving fails.
pub async fn serve(service: WorkflowService, settings: &ServerSettings) -> Result<(), WorkflowError> {
    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .map_err(|e| WorkflowError::server(format!("failed to bind to {}: {}", settings.bind, e)))?;

    tracing::info!(address = %settings.bind, "HTTP server listening");

    axum::serve(listener, router(service, settings))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WorkflowError::server(e.to_string()))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn username(headers: &HeaderMap) -> String {
    headers
        .get(USERNAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(crate::agent::DEFAULT_USERNAME)
        .to_string()
}

/// POST /infer
async fn infer(
    State(service): State<WorkflowService>,
    headers: HeaderMap,
    Json(request): Json<InferenceRequest>,
) -> Result<Json<InferenceResponse>, ApiError> {
    let username = username(&headers);
    service.infer(&username, request).await.map(Json)
}

/// GET /conversations/{username}
async fn conversations(
    State(service): State<WorkflowService>,
    Path(username): Path<String>,
) -> Result<Json<Vec<ConversationRecord>>, ApiError> {
    service.conversations(&username).await.map(Json)
}

/// GET /health
async fn health(State(service): State<WorkflowService>) -> Json<HealthStatus> {
    Json(service.health())
}

/// GET /tools
async fn list_tools(State(service): State<WorkflowService>) -> Json<ToolList> {
    Json(service.list_tools())
}

/// POST /tools
async fn add_tool(
    State(service): State<WorkflowService>,
    Json(request): Json<ToolCreate>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.add_tool(request).await.map(Json)
}

/// PUT /tools/{name}
async fn update_tool(
    State(service): State<WorkflowService>,
    Path(name): Path<String>,
    Json(update): Json<ToolUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.update_tool(&name, update).await.map(Json)
}

/// DELETE /tools/{name}
async fn delete_tool(
    State(service): State<WorkflowService>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_tool(&name).await.map(Json)
}
