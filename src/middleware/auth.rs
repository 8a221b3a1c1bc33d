use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::auth::{self, Identity, TokenKind};
use crate::error::ApiError;

/// Caller identity when present. Routes open to anonymous callers use this;
/// a missing Authorization header resolves to `None`, but a header that is
/// present and invalid is still rejected.
pub struct MaybeIdentity(pub Option<Identity>);

/// Caller identity that must carry administrative capability
/// (staff or superuser). Everything else is rejected before the handler
/// runs.
pub struct AdminIdentity(pub Identity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Ok(MaybeIdentity(None));
        }
        let identity = resolve_identity(&parts.headers)?;
        Ok(MaybeIdentity(Some(identity)))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Err(ApiError::unauthorized(
                "Authentication credentials were not provided",
            ));
        }
        let identity = resolve_identity(&parts.headers)?;
        if !identity.has_admin_capability() {
            return Err(ApiError::forbidden(
                "You do not have permission to perform this action",
            ));
        }
        Ok(AdminIdentity(identity))
    }
}

fn resolve_identity(headers: &HeaderMap) -> Result<Identity, ApiError> {
    let token = extract_bearer_token(headers).map_err(ApiError::unauthorized)?;
    let claims = auth::validate_token_of_kind(&token, TokenKind::Access)
        .map_err(|e| ApiError::unauthorized(format!("Invalid access token: {}", e)))?;
    Ok(claims.into())
}

/// Extract a bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
