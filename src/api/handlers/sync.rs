use axum::extract::State;
use serde::Serialize;

use super::{broadcast_status, buffer_for, ok, ApiResult};
use crate::api::identity::Identity;
use crate::staging::SyncStatus;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SyncResult {
    /// Mutations written (flush) or thrown away (discard).
    pub mutations: usize,
    pub status: SyncStatus,
}

pub async fn status(State(state): State<AppState>, identity: Identity) -> ApiResult<SyncStatus> {
    let buffer = buffer_for(&state, &identity).await?;
    let buffer = buffer.lock().await;
    ok(buffer.status())
}

/// Force a fresh read from the store. Unflushed changes are lost.
pub async fn load(State(state): State<AppState>, identity: Identity) -> ApiResult<SyncStatus> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    buffer.load().await?;

    broadcast_status(&state, &buffer);
    ok(buffer.status())
}

pub async fn flush(State(state): State<AppState>, identity: Identity) -> ApiResult<SyncResult> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let mutations = buffer.flush().await?;

    broadcast_status(&state, &buffer);
    ok(SyncResult {
        mutations,
        status: buffer.status(),
    })
}

pub async fn discard(State(state): State<AppState>, identity: Identity) -> ApiResult<SyncResult> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let mutations = buffer.discard();

    broadcast_status(&state, &buffer);
    ok(SyncResult {
        mutations,
        status: buffer.status(),
    })
}
