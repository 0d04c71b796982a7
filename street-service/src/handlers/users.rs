use crate::dtos::UserResponse;
use crate::middleware::LoginToken;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .store
        .find_user(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;

    Ok(Json(UserResponse::from(user)))
}

/// Sign out: revoke the login token presented with the request.
pub async fn delete_login_token(
    State(state): State<AppState>,
    token: LoginToken,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let token = token
        .as_deref()
        .ok_or_else(|| AppError::unauthorized("User is not signed-in."))?;

    if !state.store.remove_login_token(&user_id, token).await? {
        return Err(AppError::unauthorized("User is not signed-in."));
    }

    tracing::info!(user_id = %user_id, "Login token revoked");
    Ok(StatusCode::NO_CONTENT)
}
