//! Local HTTP bridge for a browser UI: post into the room and poll the log.

mod handlers;

use std::net::SocketAddr;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::chat::ChatRoomRelay;
use crate::common::ChatError;
use crate::storage::MessageStore;

#[derive(Clone)]
pub struct BridgeState {
    pub store: MessageStore,
    pub relay: ChatRoomRelay,
}

pub fn build_router(state: BridgeState) -> Router {
    Router::new()
        .route(
            "/messages",
            get(handlers::list_messages)
                .head(handlers::get_only)
                .options(handlers::preflight)
                .fallback(handlers::get_only),
        )
        .route(
            "/send",
            post(handlers::send_message)
                .options(handlers::preflight)
                .fallback(handlers::post_only),
        )
        // Open CORS on every response, preflight included.
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: BridgeState) -> Result<(), ChatError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ChatError::Network(format!("HTTP bind {addr}: {err}")))?;

    log::info!("Starting HTTP server on http://{addr}");

    axum::serve(listener, build_router(state))
        .await
        .map_err(|err| ChatError::Network(format!("HTTP server: {err}")))
}
