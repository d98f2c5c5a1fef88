//! HTTP handlers for chat endpoints.
//!
//! `POST /chat` answers in the server's default mode unless the request
//! names one; `/chat/stream` and `/chat/async` force their mode.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, StreamExt};

use super::dto::{AsyncChatResponse, ChatRequest, ChatResponse, StreamDone, StreamError};
use crate::adapters::http::dto::{handle_chat_error, ErrorResponse};
use crate::adapters::http::state::AppState;
use crate::application::{ChatCommand, ChatError, ChatStreamEvent};
use crate::config::ResponseMode;

// ════════════════════════════════════════════════════════════════════════════
// Endpoints
// ════════════════════════════════════════════════════════════════════════════

/// POST /chat - Answer in the requested or default response mode
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    match request.response_mode.unwrap_or(state.default_response_mode) {
        ResponseMode::Sync => sync_reply(&state, request).await,
        ResponseMode::Stream => stream_reply(&state, request).await,
        ResponseMode::Async => async_reply(&state, request).await,
    }
}

/// POST /chat/stream - Answer as server-sent events
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    stream_reply(&state, request).await
}

/// POST /chat/async - Submit a background task, or buffer when debouncing
pub async fn chat_async(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    async_reply(&state, request).await
}

// ════════════════════════════════════════════════════════════════════════════
// Response modes
// ════════════════════════════════════════════════════════════════════════════

async fn sync_reply(state: &AppState, request: ChatRequest) -> Response {
    let cmd = match admit(state, &request) {
        Ok(cmd) => cmd,
        Err(response) => return response,
    };

    match state.send_message.handle(cmd).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::from(reply))).into_response(),
        Err(e) => handle_chat_error(e),
    }
}

async fn stream_reply(state: &AppState, request: ChatRequest) -> Response {
    let cmd = match admit(state, &request) {
        Ok(cmd) => cmd,
        Err(response) => return response,
    };

    let events = match state.stream_message.handle(cmd).await {
        Ok(events) => events.map(to_sse_event).boxed(),
        Err(e @ ChatError::Validation(_)) => return handle_chat_error(e),
        // Once the client asked for a stream, failures travel inside it.
        Err(e) => {
            tracing::error!(error = %e, "Streaming turn could not start");
            let failed = ChatStreamEvent::Failed(e.to_string());
            stream::once(async move { to_sse_event(failed) }).boxed()
        }
    };

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

async fn async_reply(state: &AppState, request: ChatRequest) -> Response {
    let cmd = match admit(state, &request) {
        Ok(cmd) => cmd,
        Err(response) => return response,
    };
    // Already validated by `admit`.
    let window = request.debounce_window().unwrap_or_default();

    if !request.enable_debounce.unwrap_or(state.debounce_by_default) {
        let task_id = state.tasks.submit(cmd).await;
        return (
            StatusCode::ACCEPTED,
            Json(AsyncChatResponse::submitted(task_id)),
        )
            .into_response();
    }

    let session_key = cmd.session_key();
    let message = cmd.message.clone();
    let flush = state.tasks.flush_handler(cmd);
    let pending = state.buffer.enqueue(&session_key, message, flush, window).await;

    tracing::info!(
        session_key = %session_key,
        user_id = %request.user_id,
        pending,
        "Buffered async chat message"
    );
    (
        StatusCode::ACCEPTED,
        Json(AsyncChatResponse::buffered(session_key, pending)),
    )
        .into_response()
}

/// Validates the request and applies the user allow-list.
fn admit(state: &AppState, request: &ChatRequest) -> Result<ChatCommand, Response> {
    let cmd = request.to_command();
    let validated = cmd.validate().and_then(|_| request.debounce_window());
    if let Err(e) = validated {
        return Err(
            ErrorResponse::bad_request(e.to_string()).into_response_with(StatusCode::BAD_REQUEST),
        );
    }
    if !state.is_user_allowed(&cmd.user_id) {
        tracing::warn!(user_id = %cmd.user_id, "Rejected chat from user outside allow-list");
        return Err(
            ErrorResponse::forbidden("User not allowed").into_response_with(StatusCode::FORBIDDEN),
        );
    }
    Ok(cmd)
}

fn to_sse_event(event: ChatStreamEvent) -> Result<Event, Infallible> {
    let event = match event {
        ChatStreamEvent::Delta(text) => Event::default().event("message").data(sse_safe(&text)),
        ChatStreamEvent::Done(reply) => json_event(
            "done",
            &StreamDone {
                session_id: reply.session_id,
                agent_session_id: reply.agent_session_id,
            },
        ),
        ChatStreamEvent::Failed(error) => json_event("error", &StreamError { error }),
    };
    Ok(event)
}

fn json_event<T: serde::Serialize>(name: &str, payload: &T) -> Event {
    let data = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    Event::default().event(name).data(data)
}

/// SSE frames cannot carry carriage returns.
fn sse_safe(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriage_returns_are_normalized() {
        assert_eq!(sse_safe("a\r\nb\rc"), "a\nb\nc");
    }
}
