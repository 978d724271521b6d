//! Router for the chat API

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{self, HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::{
    ChatRequest, Issue, ValidationError, derive_prompt, emit_fragments, response_fragments,
    validate_chat_request,
};

type SharedState = Arc<AppState>;

/// Whether the request declares a JSON body (`application/json` or
/// any `+json` media type)
fn is_json_request(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Parse and validate a raw request body. Bodies not declared as JSON
/// are never parsed and count as missing; an empty JSON body is treated
/// as an empty object.
fn parse_chat_request(is_json: bool, body: &[u8]) -> Result<ChatRequest, ValidationError> {
    if !is_json {
        return Err(ValidationError::new(vec![Issue::missing_body()]));
    }
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return validate_chat_request(&Value::Object(Map::new()));
    }
    let value: Value = serde_json::from_slice(body)?;
    validate_chat_request(&value)
}

/// Validate the request and stream the simulated reply as plain text
async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = match parse_chat_request(is_json_request(&headers), &body) {
        Ok(request) => request,
        Err(err) => return Ok(err.into_response()),
    };

    let prompt = derive_prompt(&request);
    let fragments = response_fragments(prompt);
    let delay = state.config.chunk_delay;
    tracing::debug!(
        "Streaming {} fragments for prompt of {} chars",
        fragments.len(),
        prompt.chars().count()
    );

    // Each fragment sent on the channel becomes one chunk of the
    // response body. When the client hangs up the receiver is dropped
    // and the emitter stops on its next write.
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let body_stream = UnboundedReceiverStream::new(rx).map(Ok::<String, Infallible>);

    tokio::spawn(async move {
        let outcome = emit_fragments(&tx, fragments, delay).await;
        tracing::debug!("Chat stream finished: {:?}", outcome);
    });

    // Headers are fixed here, before the first fragment goes out
    let resp = http::Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, public::CONTENT_TYPE)
        .header(header::CACHE_CONTROL, public::CACHE_CONTROL)
        .header(header::X_CONTENT_TYPE_OPTIONS, public::CONTENT_TYPE_OPTIONS)
        .body(Body::from_stream(body_stream))?;

    Ok(resp)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
