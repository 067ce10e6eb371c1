use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{AuthToken, Credentials, UserProfile},
};

fn credentials(payload: Result<Json<Credentials>, JsonRejection>) -> AppResult<Credentials> {
    let Json(credentials) =
        payload.map_err(|_| AppError::InvalidInput("invalid_body".to_string()))?;
    credentials.validated()
}

/// Creates an account and returns a token for it
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<Json<AuthToken>> {
    let Credentials { email, password } = credentials(payload)?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email_exists".to_string()));
    }

    let password_hash = state.auth.hash_password(password).await?;
    let user = state.store.create_user(&email, &password_hash).await?;
    tracing::info!(user_id = %user.id, "Registered user");

    let token = state.auth.tokens().issue(&user)?;
    Ok(Json(AuthToken { token }))
}

/// Exchanges an email and password for a token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<Json<AuthToken>> {
    let Credentials { email, password } = credentials(payload)?;

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !state
        .auth
        .verify_password(password, user.password_hash.clone())
        .await?
    {
        tracing::debug!(user_id = %user.id, "Rejected login");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.auth.tokens().issue(&user)?;
    Ok(Json(AuthToken { token }))
}

/// Returns the caller's identity
pub async fn me(user: AuthUser) -> Json<UserProfile> {
    Json(user.profile())
}
