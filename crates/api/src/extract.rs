//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use postul_core::types::{DbId, ANONYMOUS_USER_ID};

use crate::error::AppError;

/// Header carrying the caller's user id, set by the edge proxy after
/// authentication.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, resolved from the `x-user-id` header.
///
/// Authentication itself happens upstream; this service only scopes its
/// queries by the id the edge hands it. A missing header maps to the
/// anonymous user so local development works without a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub DbId);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(CallerId(ANONYMOUS_USER_ID));
        };
        let id = value
            .to_str()
            .ok()
            .and_then(|s| s.parse::<DbId>().ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!("{USER_ID_HEADER} must be a numeric user id"))
            })?;
        Ok(CallerId(id))
    }
}
