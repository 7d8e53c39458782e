use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{broadcast_status, buffer_for, ok, ApiResult, FilterQuery};
use crate::analytics::Outcome;
use crate::api::identity::Identity;
use crate::api::ws_types::WsMessage;
use crate::errors::AppError;
use crate::models::{BetStatus, NewWager, Wager};
use crate::staging::StagingBuffer;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Vec<Wager>> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let view = buffer.view().await?;
    ok(query.to_filter().apply(view.wagers()))
}

/// Open wagers awaiting a result.
pub async fn pending(State(state): State<AppState>, identity: Identity) -> ApiResult<Vec<Wager>> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let view = buffer.view().await?;
    ok(view.wagers().iter().filter(|w| w.is_pending()).cloned().collect())
}

pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<NewWager>,
) -> ApiResult<Wager> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let wager = buffer.add_wager(body).await?;

    publish_wager(&state, &buffer, &wager);
    broadcast_status(&state, &buffer);
    ok(wager)
}

fn publish_wager(state: &AppState, buffer: &StagingBuffer, wager: &Wager) {
    let _ = state.ws_tx.send(WsMessage::WagerUpdate {
        identity: buffer.names().identity().map(str::to_string),
        wager: wager.clone(),
    });
}

#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub status: BetStatus,
    pub payout: Option<Decimal>,
}

pub async fn settle(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(body): Json<SettleRequest>,
) -> ApiResult<Wager> {
    let outcome = Outcome::from_status(body.status, body.payout)
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .ok_or_else(|| AppError::BadRequest("a wager cannot be settled back to Pending".into()))?;

    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let wager = buffer.settle_wager(id, outcome).await?;

    publish_wager(&state, &buffer, &wager);
    broadcast_status(&state, &buffer);
    ok(wager)
}

pub async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> ApiResult<Wager> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let removed = buffer.delete_wager(id).await?;

    broadcast_status(&state, &buffer);
    ok(removed)
}
