//! Request extractors.
//!
//! Authentication itself is handled by an upstream gateway (an excluded
//! collaborator); handlers identify the acting user from the `x-user-id`
//! header it injects.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use daybook_core::types::DbId;

use crate::error::AppError;

/// Header carrying the authenticated user's id.
const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf the request acts.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser {
    pub user_id: DbId,
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("missing {USER_ID_HEADER} header")))?;

        let user_id: DbId = value
            .to_str()
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!("{USER_ID_HEADER} must be a numeric user id"))
            })?;

        Ok(ActingUser { user_id })
    }
}
