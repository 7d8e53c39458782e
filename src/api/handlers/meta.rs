use axum::extract::State;
use axum::Json;

use super::{broadcast_status, buffer_for, ok, ApiResult};
use crate::api::identity::Identity;
use crate::models::MetaConfig;
use crate::AppState;

pub async fn get_meta(State(state): State<AppState>, identity: Identity) -> ApiResult<MetaConfig> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let view = buffer.view().await?;
    ok(view.meta().clone())
}

pub async fn update_meta(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<MetaConfig>,
) -> ApiResult<MetaConfig> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let meta = buffer.replace_meta(body).await?;

    tracing::info!(
        identity = buffer.names().identity_label(),
        bookies = meta.bookies.len(),
        "Meta configuration replaced"
    );
    broadcast_status(&state, &buffer);
    ok(meta)
}
