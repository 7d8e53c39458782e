use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Bearer token required when API_TOKEN is set
    let protected = Router::new()
        // Wagers
        .route("/api/wagers", get(handlers::wagers::list).post(handlers::wagers::create))
        .route("/api/wagers/pending", get(handlers::wagers::pending))
        .route("/api/wagers/:id", delete(handlers::wagers::delete))
        .route("/api/wagers/:id/settle", post(handlers::wagers::settle))
        // Cash
        .route("/api/cash", get(handlers::cash::list).post(handlers::cash::create))
        // Meta
        .route("/api/meta", get(handlers::meta::get_meta).put(handlers::meta::update_meta))
        // Bankroll
        .route("/api/bankroll", get(handlers::bankroll::summary))
        // Analytics
        .route("/api/analytics/summary", get(handlers::analytics::summary))
        .route("/api/analytics/timeline", get(handlers::analytics::timeline))
        .route("/api/analytics/equity-curve", get(handlers::analytics::equity))
        .route("/api/analytics/by-sport", get(handlers::analytics::by_sport))
        .route("/api/analytics/cashouts", get(handlers::analytics::cashouts))
        // Sync
        .route("/api/sync/status", get(handlers::sync::status))
        .route("/api/sync/load", post(handlers::sync::load))
        .route("/api/sync/flush", post(handlers::sync::flush))
        .route("/api/sync/discard", post(handlers::sync::discard))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
