use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::chat::normalizer;
use crate::common::{ChatError, DisplayMessage, IncomingPost, UserType};

use super::BridgeState;

/// `GET /messages`: the whole log, oldest first.
pub async fn list_messages(State(state): State<BridgeState>) -> Json<Vec<DisplayMessage>> {
    Json(state.store.snapshot())
}

/// `POST /send`: the local echo is stored before publishing, so the poster
/// sees their message even when the overlay rejects it.
pub async fn send_message(State(state): State<BridgeState>, body: Bytes) -> Response {
    let post = match serde_json::from_slice::<IncomingPost>(&body) {
        Ok(post) if !post.message.is_empty() => post,
        Ok(_) => {
            log::debug!("Rejected post: {}", ChatError::EmptyContent);
            return (StatusCode::BAD_REQUEST, "failed to decode").into_response();
        }
        Err(err) => {
            log::debug!("Rejected post: {err}");
            return (StatusCode::BAD_REQUEST, "failed to decode").into_response();
        }
    };

    let user_type = UserType::from_role(&post.user_type);
    let wire = match normalizer::to_wire(&post.message, user_type) {
        Ok(wire) => wire,
        Err(err) => {
            log::error!("Failed to encode post: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode message")
                .into_response();
        }
    };

    state.store.append(normalizer::local_echo(&post.message, user_type));

    match state.relay.publish(&wire).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => {
            log::warn!("Sending message failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to publish").into_response()
        }
    }
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn get_only() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, "Only GET Method supported")
}

pub async fn post_only() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, "Only POST Method supported")
}
