use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{buffer_for, ok, ApiResult, FilterQuery};
use crate::analytics::timeline::{EquityPoint, SportProfit};
use crate::analytics::{
    bucketize, cashout_results, equity_curve, profit_by_sport, summarize, LedgerSummary,
    Resolution, TimeBucket,
};
use crate::api::identity::Identity;
use crate::errors::AppError;
use crate::models::Wager;
use crate::AppState;

/// Filtered wagers for the caller; every analytics view starts here.
async fn filtered(
    state: &AppState,
    identity: &Identity,
    query: &FilterQuery,
) -> Result<Vec<Wager>, AppError> {
    let buffer = buffer_for(state, identity).await?;
    let mut buffer = buffer.lock().await;
    let view = buffer.view().await?;
    Ok(query.to_filter().apply(view.wagers()))
}

pub async fn summary(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FilterQuery>,
) -> ApiResult<LedgerSummary> {
    let wagers = filtered(&state, &identity, &query).await?;
    ok(summarize(&wagers))
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub resolution: Option<String>,
    #[serde(flatten)]
    pub filter: FilterQuery,
}

pub async fn timeline(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<TimelineQuery>,
) -> ApiResult<Vec<TimeBucket>> {
    let resolution = match query.resolution.as_deref() {
        None => Resolution::default(),
        Some(r) => r
            .parse::<Resolution>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
    };

    let wagers = filtered(&state, &identity, &query.filter).await?;
    ok(bucketize(&wagers, resolution))
}

pub async fn equity(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Vec<EquityPoint>> {
    let wagers = filtered(&state, &identity, &query).await?;
    ok(equity_curve(&wagers))
}

pub async fn by_sport(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Vec<SportProfit>> {
    let wagers = filtered(&state, &identity, &query).await?;
    ok(profit_by_sport(&wagers))
}

pub async fn cashouts(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Vec<Decimal>> {
    let wagers = filtered(&state, &identity, &query).await?;
    ok(cashout_results(&wagers))
}
