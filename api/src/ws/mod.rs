//! WebSocket surface: the live dashboard feed.
//!
//! `/ws/dashboard` subscribes the connection to the dashboard topic; every
//! scan outcome broadcast by the attendance handlers is forwarded verbatim.
//! The connection is read-mostly; client frames other than close are ignored.

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
};
use tokio::sync::broadcast::error::RecvError;
use util::state::AppState;

use crate::auth::guards::allow_authenticated;

pub mod topics {
    pub fn dashboard_topic() -> String {
        "dashboard".to_string()
    }
}

pub fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard_ws_handler))
        .route_layer(from_fn(allow_authenticated))
        .with_state(app_state)
}

async fn dashboard_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_dashboard(socket, state))
}

async fn serve_dashboard(mut socket: WebSocket, state: AppState) {
    let mut rx = state.ws().subscribe(&topics::dashboard_topic()).await;

    loop {
        tokio::select! {
            broadcast = rx.recv() => match broadcast {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "dashboard subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
