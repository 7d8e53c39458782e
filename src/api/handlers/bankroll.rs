use axum::extract::State;

use super::{buffer_for, ok, ApiResult};
use crate::analytics::{bankroll_summary, BookieBalance};
use crate::api::identity::Identity;
use crate::AppState;

pub async fn summary(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Vec<BookieBalance>> {
    let buffer = buffer_for(&state, &identity).await?;
    let mut buffer = buffer.lock().await;
    let view = buffer.view().await?;
    ok(bankroll_summary(&view.meta().bookies, view.wagers(), view.cash()))
}
