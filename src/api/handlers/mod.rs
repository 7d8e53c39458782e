pub mod analytics;
pub mod bankroll;
pub mod cash;
pub mod health;
pub mod meta;
pub mod metrics;
pub mod sync;
pub mod wagers;
pub mod ws;

use std::sync::Arc;

use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::identity::Identity;
use super::ws_types::WsMessage;
use crate::analytics::WagerFilter;
use crate::errors::AppError;
use crate::staging::StagingBuffer;
use crate::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }))
}

/// Staging buffer for the caller's identity.
pub async fn buffer_for(
    state: &AppState,
    identity: &Identity,
) -> Result<Arc<Mutex<StagingBuffer>>, AppError> {
    Ok(state.sessions.buffer(identity.as_deref()).await?)
}

/// Tell dashboard clients about the buffer's current sync state. Having no
/// subscribers is normal.
pub fn broadcast_status(state: &AppState, buffer: &StagingBuffer) {
    let _ = state.ws_tx.send(WsMessage::SyncStatus(buffer.status()));
}

/// Multiselect filters as comma-separated query parameters, e.g.
/// `?league=NBA,EPL&bookie=Pinnacle`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub league: Option<String>,
    pub bookie: Option<String>,
    pub sport: Option<String>,
}

impl FilterQuery {
    pub fn to_filter(&self) -> WagerFilter {
        fn split(v: &Option<String>) -> Vec<String> {
            v.as_deref()
                .unwrap_or("")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        }

        WagerFilter {
            leagues: split(&self.league),
            bookies: split(&self.bookie),
            sports: split(&self.sport),
        }
    }
}
