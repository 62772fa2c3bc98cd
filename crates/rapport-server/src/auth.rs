//! Request identity.
//!
//! Sessions are handled upstream; by the time a request reaches this
//! service the authenticated user's id is in the `X-User-Id` header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use rapport_core::model::UserId;

use crate::error::ApiError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Rejects with 401 when the header is missing,
/// malformed, or names an unknown user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("missing X-User-Id header".into()))?;

        let id: UserId = raw
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| ApiError::Unauthorized("invalid X-User-Id header".into()))?;

        if state.service.store().get_user(id).await?.is_none() {
            return Err(ApiError::Unauthorized(format!("unknown user {id}")));
        }

        Ok(CurrentUser(id))
    }
}
