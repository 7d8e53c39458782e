use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use super::buffer_for;
use crate::api::identity::Identity;
use crate::api::ws_types::WsMessage;
use crate::errors::AppError;
use crate::staging::TableNames;
use crate::AppState;

/// Browsers cannot set headers on a WebSocket handshake, so the identity may
/// also come as `?user=`.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub user: Option<String>,
}

pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<WsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let identity = match identity.0 {
        Some(user) => Identity(Some(user)),
        None => Identity(query.user.filter(|u| !u.trim().is_empty())),
    };
    // Reject bad identities before upgrading.
    let names = TableNames::for_identity(identity.as_deref())?;
    let owner = names.identity().map(str::to_string);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity, owner)))
}

async fn send(socket: &mut WebSocket, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WsMessage");
            true
        }
    }
}

async fn handle_socket(
    mut socket: WebSocket,
    state: AppState,
    identity: Identity,
    owner: Option<String>,
) {
    let label = owner.as_deref().unwrap_or("default");
    tracing::info!(identity = label, "Ledger WebSocket client connected");

    let mut rx = state.ws_tx.subscribe();

    // Current unsaved-change count so the client does not wait for the
    // next mutation to render its banner.
    match buffer_for(&state, &identity).await {
        Ok(buffer) => {
            let status = buffer.lock().await.status();
            if !send(&mut socket, &WsMessage::SyncStatus(status)).await {
                return;
            }
        }
        Err(e) => {
            tracing::warn!(identity = label, error = %e, "No buffer for WebSocket snapshot");
            return;
        }
    }

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Ok(ws_msg) if ws_msg.visible_to(owner.as_deref()) => {
                        if !send(&mut socket, &ws_msg).await {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(identity = label, skipped = n, "Ledger WS client lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            client_msg = socket.recv() => {
                match client_msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    tracing::info!(identity = label, "Ledger WebSocket client disconnected");
}
