//! Role-based access control.
//!
//! [`RequireAdmin`] wraps [`AuthUser`] and rejects non-admin callers at the
//! type level. Resource ownership is checked with [`ensure_owner_or_admin`]
//! once the resource has been loaded.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use propgo_core::error::CoreError;
use propgo_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Allow the resource owner or any admin; 403 for everyone else.
pub fn ensure_owner_or_admin(user: &AuthUser, owner_id: DbId) -> Result<(), AppError> {
    if user.user_id == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only the owner or an admin can modify this listing".into(),
        )))
    }
}
