//! Handlers for the `/users` resource (own profile, admin role changes).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use propgo_core::error::CoreError;
use propgo_core::types::{DbId, Role};
use propgo_db::models::user::{UpdateProfile, UserResponse};
use propgo_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /users/profile`. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Phone cannot be empty."))]
    pub phone: Option<String>,
}

/// Request body for `PUT /users/{id}/role`. Unknown roles fail to
/// deserialize and are answered with 400.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let found = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(found),
    }))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let patch = UpdateProfile {
        name: input.name.map(|n| n.trim().to_string()),
        phone: input.phone.map(|p| p.trim().to_string()),
    };
    let updated = UserRepo::update_profile(&state.pool, user.user_id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(updated),
    }))
}

/// PUT /api/users/{id}/role
///
/// Promote or demote a user and sign them out everywhere. Admin only.
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    payload: Result<Json<SetRoleRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let Json(input) = payload?;
    if !UserRepo::set_role(&state.pool, id, input.role).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    // Sessions issued under the old role must not mint new access tokens.
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, admin_id = admin.user_id, role = %input.role, revoked, "Role changed");

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}
