use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::user::User;

/// Resolved caller identity consumed by the catalog endpoints.
///
/// Everything downstream of the auth gateway works off this value object;
/// handlers never look at tokens or user rows directly.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Identity {
    /// Either privilege flag grants administrative capability.
    pub fn has_admin_capability(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.sub,
            is_staff: claims.is_staff,
            is_superuser: claims.is_superuser,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub token_type: TokenKind,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user: &User, kind: TokenKind) -> Self {
        let now = Utc::now();
        let security = &config::config().security;
        let lifetime = match kind {
            TokenKind::Access => Duration::minutes(security.access_token_expiry_mins as i64),
            TokenKind::Refresh => Duration::days(security.refresh_token_expiry_days as i64),
        };

        Self {
            sub: user.username.clone(),
            user_id: user.id,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            token_type: kind,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("token generation failed: {0}")]
    Generation(String),
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("wrong token type")]
    WrongKind,
}

pub fn generate_token(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Validate signature and expiry, returning the decoded claims.
pub fn validate_token(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

/// Validate a token and require it to be of the given kind.
pub fn validate_token_of_kind(token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
    let claims = validate_token(token)?;
    if claims.token_type != kind {
        return Err(TokenError::WrongKind);
    }
    Ok(claims)
}

/// Issue an access + refresh pair for a user.
pub fn issue_token_pair(user: &User) -> Result<(String, String), TokenError> {
    let access = generate_token(&Claims::new(user, TokenKind::Access))?;
    let refresh = generate_token(&Claims::new(user, TokenKind::Refresh))?;
    Ok((access, refresh))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
