use axum::extract::State;
use axum::Json;

use super::{broadcast_status, buffer_for, ok, ApiResult};
use crate::api::identity::Identity;
use crate::models::{CashTransaction, NewCashTransaction};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Vec<CashTransaction>> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let view = buffer.view().await?;
    ok(view.cash().to_vec())
}

pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<NewCashTransaction>,
) -> ApiResult<CashTransaction> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let tx = buffer.add_cash(body).await?;

    broadcast_status(&state, &buffer);
    ok(tx)
}
