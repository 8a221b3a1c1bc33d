//! Startup account bootstrap driven by environment variables. Missing
//! variables skip that account; an existing username is left untouched.

use anyhow::{anyhow, Context, Result};
use sqlx::SqlitePool;
use std::env;
use tracing::info;

use super::repository::users;
use crate::auth;

pub async fn seed_users_from_env(pool: &SqlitePool) -> Result<()> {
    seed_account(
        pool,
        "PIZZERIA_SUPERUSER_USERNAME",
        "PIZZERIA_SUPERUSER_PASSWORD",
        true,
        true,
    )
    .await?;
    seed_account(
        pool,
        "PIZZERIA_STAFF_USERNAME",
        "PIZZERIA_STAFF_PASSWORD",
        true,
        false,
    )
    .await?;
    seed_account(
        pool,
        "PIZZERIA_NORMAL_USERNAME",
        "PIZZERIA_NORMAL_PASSWORD",
        false,
        false,
    )
    .await?;
    Ok(())
}

async fn seed_account(
    pool: &SqlitePool,
    username_var: &str,
    password_var: &str,
    is_staff: bool,
    is_superuser: bool,
) -> Result<()> {
    let (username, password) = match (env::var(username_var), env::var(password_var)) {
        (Ok(u), Ok(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            info!(
                "skipping account seed: {} or {} not set",
                username_var, password_var
            );
            return Ok(());
        }
    };

    if users::find_by_username(pool, &username)
        .await
        .with_context(|| format!("looking up seed user '{}'", username))?
        .is_some()
    {
        info!("user '{}' already exists", username);
        return Ok(());
    }

    let password_hash =
        auth::hash_password(&password).map_err(|e| anyhow!("password hashing failed: {}", e))?;
    users::create(pool, &username, &password_hash, is_staff, is_superuser)
        .await
        .with_context(|| format!("creating seed user '{}'", username))?;

    info!(
        "user '{}' created (staff={}, superuser={})",
        username, is_staff, is_superuser
    );
    Ok(())
}
