use serde::Serialize;
use sqlx::FromRow;

/// Account record backing the authentication gateway. The catalog endpoints
/// never see this directly; they consume the derived `auth::Identity`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}
