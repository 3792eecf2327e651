//! Account handlers: signup, login, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::request::{LoginRequest, SignupBody, validate_body};
use crate::dto::response::{SignupResponse, TokenResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/accounts/signup/
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    validate_body(&body)?;
    let user = state.sessions.signup(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// POST /api/accounts/login/
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_body(&body)?;
    let result = state.sessions.login(&body.email, &body.password).await?;
    Ok(Json(TokenResponse {
        token: result.token,
    }))
}

/// POST /api/accounts/logout/
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    state.sessions.logout(&auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/accounts/me/
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.sessions.current_user(&auth).await?;
    Ok(Json(user.into()))
}
