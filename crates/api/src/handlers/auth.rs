//! Handlers for the `/auth` resource (signup, login, refresh, logout).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use propgo_core::error::CoreError;
use propgo_db::models::session::NewSession;
use propgo_db::models::user::{CreateUser, User, UserResponse};
use propgo_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{hash_refresh_token, issue_access_token, RefreshToken};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub phone: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "This field is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

/// Request body for `POST /auth/refresh` and `POST /auth/logout`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by signup, login, and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Register a new account and sign it in. Returns 201 with tokens.
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;

    let email = normalize_email(&input.email);
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User signed up");

    let response = start_session(&state, user, &headers).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    input.validate()?;

    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = user.id, "Failed login attempt");
        return Err(invalid());
    }

    let response = start_session(&state, user, &headers).await?;
    Ok(Json(response))
}

/// POST /api/auth/refresh
///
/// Exchange a live refresh token for a new token pair. The presented token
/// is spent even if it is replayed concurrently.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    };

    let next = RefreshToken::generate();
    let session = SessionRepo::rotate(
        &state.pool,
        &hash_refresh_token(&input.refresh_token),
        &new_session(&state, &next, &headers),
    )
    .await?
    .ok_or_else(invalid)?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    tracing::debug!(user_id = user.id, session_id = session.id, "Refresh token rotated");
    Ok(Json(auth_response(&state, user, next)?))
}

/// POST /api/auth/logout
///
/// Revoke the supplied refresh token. Unknown or already revoked tokens are
/// accepted so logout is idempotent. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<StatusCode> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    match SessionRepo::revoke_by_hash(&state.pool, &token_hash).await? {
        Some(user_id) => tracing::info!(user_id, "Logged out"),
        None => tracing::debug!("Logout with an unknown or spent refresh token"),
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Longest `User-Agent` kept on a session row.
const MAX_USER_AGENT_LEN: usize = 255;

/// The client's `User-Agent`, if it sent a readable one.
fn user_agent(headers: &HeaderMap) -> Option<String> {
    let agent = headers.get(USER_AGENT)?.to_str().ok()?.trim();
    if agent.is_empty() {
        return None;
    }
    Some(agent.chars().take(MAX_USER_AGENT_LEN).collect())
}

fn new_session(state: &AppState, token: &RefreshToken, headers: &HeaderMap) -> NewSession {
    NewSession {
        refresh_token_hash: token.hash.clone(),
        expires_at: state.config.jwt.refresh_expires_at(),
        user_agent: user_agent(headers),
    }
}

/// Persist a fresh session for `user` and answer with its token pair.
async fn start_session(state: &AppState, user: User, headers: &HeaderMap) -> AppResult<AuthResponse> {
    let refresh = RefreshToken::generate();
    SessionRepo::create(&state.pool, user.id, &new_session(state, &refresh, headers)).await?;
    auth_response(state, user, refresh)
}

fn auth_response(state: &AppState, user: User, refresh: RefreshToken) -> AppResult<AuthResponse> {
    let access_token = issue_access_token(user.id, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: state.config.jwt.access_ttl_secs(),
        user: UserResponse::from(user),
    })
}
