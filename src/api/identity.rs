use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::errors::AppError;

pub const IDENTITY_HEADER: &str = "x-ledger-user";

/// Ledger owner for the request, from the `X-Ledger-User` header. Absent
/// means the default single-user ledger.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(IDENTITY_HEADER) {
            None => Ok(Identity(None)),
            Some(v) => {
                let user = v
                    .to_str()
                    .map_err(|_| AppError::BadRequest(format!("{IDENTITY_HEADER} must be ASCII")))?
                    .trim();
                if user.is_empty() {
                    Ok(Identity(None))
                } else {
                    Ok(Identity(Some(user.to_string())))
                }
            }
        }
    }
}
