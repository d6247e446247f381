use crate::{
    AppState,
    types::{SendMessageRequest, SendMessageResponse},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{error, info};

const FAILURE_MESSAGE: &str = "Failed to send message";

/// Send a WhatsApp message
///
/// The destination is a bare phone number; the channel prefix and sender
/// come from configuration.
#[utoipa::path(
    post,
    path = "/api/send-whatsapp-message",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message accepted by the provider", body = SendMessageResponse),
        (status = 500, description = "Message could not be sent", body = SendMessageResponse)
    ),
    tag = "messaging"
)]
pub async fn send_whatsapp_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> (StatusCode, Json<SendMessageResponse>) {
    let failure = || {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SendMessageResponse::failed(FAILURE_MESSAGE)),
        )
    };

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(e) => {
            error!("Invalid messaging request: {}", e.body_text());
            return failure();
        }
    };

    match state.messenger.send(&request.to, &request.message).await {
        Ok(message_id) => {
            info!(%message_id, "WhatsApp message sent");
            (StatusCode::OK, Json(SendMessageResponse::sent(message_id)))
        }
        Err(e) => {
            error!("Error sending WhatsApp message: {}", e);
            failure()
        }
    }
}
