//! HTTP request handlers

use super::types::{ChatRequest, ErrorResponse, HealthResponse};
use super::AppState;
use crate::runtime::{HandoffError, HelpdeskClient, Responder};
use crate::state_machine::TimelineEntry;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router<H, R>(state: AppState<H, R>) -> Router
where
    H: HelpdeskClient + 'static,
    R: Responder + 'static,
{
    Router::new()
        // Inbound user messages
        .route("/chat", post(send_chat::<H, R>))
        // Timeline polling; reconciles with the helpdesk first
        .route("/messages/:user_id", get(get_messages::<H, R>))
        .route("/health", get(health::<H, R>))
        .with_state(state)
}

async fn send_chat<H, R>(
    State(state): State<AppState<H, R>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TimelineEntry>, AppError>
where
    H: HelpdeskClient,
    R: Responder,
{
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let entry = state
        .controller
        .post_user_message(&request.user_id, &request.message)
        .await?;

    Ok(Json(entry))
}

async fn get_messages<H, R>(
    State(state): State<AppState<H, R>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TimelineEntry>>, AppError>
where
    H: HelpdeskClient,
    R: Responder,
{
    let timeline = state.controller.timeline(&user_id).await?;
    Ok(Json(timeline))
}

async fn health<H, R>(State(state): State<AppState<H, R>>) -> Json<HealthResponse>
where
    H: HelpdeskClient,
    R: Responder,
{
    Json(HealthResponse {
        ok: true,
        stats: state.controller.stats(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    BadGateway(String),
    Internal(String),
}

impl From<HandoffError> for AppError {
    fn from(e: HandoffError) -> Self {
        match e {
            HandoffError::InvalidUser => AppError::BadRequest(e.to_string()),
            HandoffError::ChannelUnavailable(_) => AppError::BadGateway(e.to_string()),
            HandoffError::Transition(_) | HandoffError::NoResponse => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
