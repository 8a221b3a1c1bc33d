//! Authentication gateway endpoints: token pair issuance, refresh, and
//! verification. Catalog handlers never touch credentials; they consume the
//! identity resolved from the access token.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::auth::{self, Claims, TokenError, TokenKind};
use crate::database::models::user::User;
use crate::database::repository::users;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// POST /auth/token/ - authenticate and receive an access + refresh pair
pub async fn token_obtain(
    State(state): State<AppState>,
    Json(payload): Json<CredentialRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = authenticate(&state.pool, &payload).await?;
    let (access, refresh) = auth::issue_token_pair(&user).map_err(token_error)?;

    Ok(Json(json!({ "access": access, "refresh": refresh })))
}

/// POST /auth/token/refresh/ - exchange a refresh token for a new access
/// token. The user row is re-read so privilege changes take effect here,
/// not only at the next login.
pub async fn token_refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    let claims = auth::validate_token_of_kind(&payload.refresh, TokenKind::Refresh)
        .map_err(token_error)?;

    let user = users::find_by_username(&state.pool, &claims.sub)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("No active account found for this token"))?;

    let access =
        auth::generate_token(&Claims::new(&user, TokenKind::Access)).map_err(token_error)?;
    Ok(Json(json!({ "access": access })))
}

/// POST /auth/token/verify/ - check signature and expiry of any token
pub async fn token_verify(Json(payload): Json<VerifyRequest>) -> Result<Json<Value>, ApiError> {
    auth::validate_token(&payload.token).map_err(token_error)?;
    Ok(Json(json!({})))
}

/// POST /auth/obtain-token/ - single bearer credential login
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(payload): Json<CredentialRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = authenticate(&state.pool, &payload).await?;
    let token = auth::generate_token(&Claims::new(&user, TokenKind::Access)).map_err(token_error)?;

    Ok(Json(json!({ "token": token })))
}

async fn authenticate(pool: &SqlitePool, payload: &CredentialRequest) -> Result<User, ApiError> {
    let user = users::find_by_username(pool, &payload.username)
        .await
        .map_err(ApiError::from)?;

    // Same rejection for unknown user and wrong password
    match user {
        Some(user) if auth::verify_password(&payload.password, &user.password_hash) => Ok(user),
        _ => Err(ApiError::unauthorized(
            "No active account found with the given credentials",
        )),
    }
}

fn token_error(err: TokenError) -> ApiError {
    match err {
        TokenError::Invalid(_) | TokenError::WrongKind => {
            ApiError::unauthorized("Token is invalid or expired")
        }
        TokenError::MissingSecret | TokenError::Generation(_) => {
            tracing::error!("token issuance failure: {}", err);
            ApiError::internal_server_error("An error occurred while processing your request")
        }
    }
}
