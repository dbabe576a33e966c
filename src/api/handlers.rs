//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AgentInfo, ErrorResponse, SubmitResponse, SuccessResponse, TextRequest, WidgetStateResponse,
};
use super::AppState;
use crate::runtime::{RuntimeError, Submission};
use crate::state_machine::TransitionError;
use crate::widget::WidgetError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Widget state
        .route("/api/widget", get(get_widget))
        // Visibility
        .route("/api/widget/open", post(open_widget))
        .route("/api/widget/close", post(close_widget))
        // User input
        .route("/api/widget/draft", post(edit_draft))
        .route("/api/widget/messages", post(submit_message))
        // SSE streaming
        .route("/api/widget/stream", get(stream_widget))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Widget State
// ============================================================

fn widget_state(state: &AppState) -> WidgetStateResponse {
    let widget = &state.widget;
    let config = widget.config();
    let snapshot = widget.snapshot();

    WidgetStateResponse {
        is_open: widget.is_open(),
        session_id: widget.session_id().map(ToString::to_string),
        agent: AgentInfo {
            name: config.agent_name.clone(),
            avatar: config.agent_avatar.clone(),
        },
        pending: snapshot.as_ref().is_some_and(|s| s.pending),
        draft: snapshot.as_ref().map(|s| s.draft.clone()).unwrap_or_default(),
        messages: snapshot.map(|s| s.messages).unwrap_or_default(),
    }
}

async fn get_widget(State(state): State<AppState>) -> Json<WidgetStateResponse> {
    Json(widget_state(&state))
}

async fn open_widget(State(state): State<AppState>) -> Json<WidgetStateResponse> {
    state.widget.open();
    Json(widget_state(&state))
}

async fn close_widget(State(state): State<AppState>) -> Json<WidgetStateResponse> {
    state.widget.close();
    Json(widget_state(&state))
}

// ============================================================
// User Input
// ============================================================

async fn edit_draft(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.widget.edit_draft(req.text).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn submit_message(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let outcome = state.widget.submit(req.text).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            accepted: outcome == Submission::Accepted,
        }),
    ))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_widget(State(state): State<AppState>) -> Result<Response, AppError> {
    let runtime = state.widget.runtime()?;
    // Subscribe before taking the snapshot so no event falls in between
    let broadcast_rx = runtime.subscribe();
    let init = runtime.snapshot();
    Ok(sse_stream(init, broadcast_rx).into_response())
}

async fn get_version() -> &'static str {
    concat!("webchat-widget ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    Conflict(String),
    Unavailable(String),
    Internal(String),
}

impl From<WidgetError> for AppError {
    fn from(err: WidgetError) -> Self {
        match err {
            WidgetError::NotActivated
            | WidgetError::Runtime(RuntimeError::Rejected(TransitionError::ExchangeInFlight)) => {
                AppError::Conflict(err.to_string())
            }
            WidgetError::Runtime(RuntimeError::Stopped) => AppError::Unavailable(err.to_string()),
            WidgetError::Runtime(RuntimeError::Rejected(TransitionError::InvalidTransition(_)))
            | WidgetError::Transport(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
