//! Authorization extractors.
//!
//! Each guard wraps [`AuthUser`] and re-reads the user's flags from the
//! database, so revoking ownership or store access takes effect on the next
//! request instead of when the access token expires.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use onboard_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `users.is_owner`. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn owner_only(RequireOwner(owner): RequireOwner) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug)]
pub struct RequireOwner(pub AuthUser);

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match UserRepo::is_owner(&state.pool, user.user_id).await? {
            Some(true) => Ok(RequireOwner(user)),
            Some(false) => Err(AppError::forbidden("Owner access required")),
            None => Err(AppError::unauthorized("User no longer exists")),
        }
    }
}

/// Requires store access: owners, or users granted `store_access`.
#[derive(Debug)]
pub struct RequireStoreAccess(pub AuthUser);

impl FromRequestParts<AppState> for RequireStoreAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let record = UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
        if !(record.is_owner || record.store_access) {
            return Err(AppError::forbidden("Store access has not been granted"));
        }
        Ok(RequireStoreAccess(user))
    }
}
