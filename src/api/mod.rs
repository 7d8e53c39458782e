pub mod auth;
pub mod handlers;
pub mod identity;
pub mod router;
pub mod ws_types;
