//! Caller identity.
//!
//! There is no token authentication: a request names its caller in the
//! `X-User-Id` header and the server only checks that the user exists.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::state::AppState;
use crate::db::{Database, DbError, User, UserRepository};

/// Header carrying the caller's user id.
pub const USER_HEADER: &str = "x-user-id";

/// The user making the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl<D> FromRequestParts<AppState<D>> for CurrentUser
where
    D: Database + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<D>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("missing X-User-Id header".to_string()))?
            .to_string();

        match state.db().users().get(&user_id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(DbError::NotFound { .. }) => Err(ApiError::Unauthorized(format!(
                "unknown user '{}'",
                user_id
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
