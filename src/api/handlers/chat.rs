use crate::{
    AppState,
    herd::record_herd,
    llm::{LLMClient, prompt::build_prompt},
    types::{AppError, ChatRequest, ErrorBody, Result},
};
use async_stream::stream;
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::{Stream, StreamExt};
use tracing::{debug, error, info};

const FAILURE_MESSAGE: &str = "Failed to process request";

type TextStream = Box<dyn Stream<Item = Result<String>> + Send + Unpin>;

/// Tracks one relay so a client disconnect shows up in the logs.
///
/// The relay future is dropped when the client goes away, which drops the
/// upstream stream with it.
#[derive(Default)]
struct RelayGuard {
    chunks: usize,
    completed: bool,
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        if !self.completed {
            info!(
                chunks = self.chunks,
                "Client disconnected, upstream stream cancelled"
            );
        }
    }
}

/// Pipes upstream text fragments into response body frames verbatim.
///
/// An upstream error after the response has started is logged and ends the
/// body.
fn relay(mut upstream: TextStream) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send {
    stream! {
        let mut guard = RelayGuard::default();

        while let Some(item) = upstream.next().await {
            match item {
                Ok(text) => {
                    guard.chunks += 1;
                    yield Ok::<Bytes, std::io::Error>(Bytes::from(text));
                }
                Err(e) => {
                    error!("Error in streaming: {}", e);
                    break;
                }
            }
        }

        guard.completed = true;
        debug!(chunks = guard.chunks, "Chat relay finished");
    }
}

async fn open_stream(
    state: &AppState,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<TextStream> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    debug!(user = ?request.user_id, "AI chat request");

    let prompt = build_prompt(&record_herd(), &request.message)?;
    let client: Box<dyn LLMClient> = state.llm_factory.create_default().await?;
    debug!(model = client.model_name(), "Opening completion stream");

    client.stream(&prompt).await
}

/// Ask the dairy advisor a question
///
/// The answer is relayed as a chunked `text/plain` body while the model
/// generates it.
#[utoipa::path(
    post,
    path = "/api/ai/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Streamed answer", content_type = "text/plain", body = String),
        (status = 500, description = "Request could not be processed", body = ErrorBody)
    ),
    tag = "ai"
)]
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    match open_stream(&state, payload).await {
        Ok(upstream) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(relay(upstream)),
        )
            .into_response(),
        Err(e) => {
            error!("Error in AI chat: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: FAILURE_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
    }
}
