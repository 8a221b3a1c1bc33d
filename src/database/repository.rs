//! Query layer over the catalog tables. All association changes go through
//! the explicit add/remove/replace operations here; nothing cascades.

use rust_decimal::Decimal;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};
use std::collections::HashSet;
use thiserror::Error;

use super::models::ingredient::{Ingredient, IngredientCategory};
use super::models::pizza::{Pizza, PizzaStatus};
use super::models::user::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pizza {0} not found")]
    PizzaNotFound(i64),

    #[error("ingredient {0} not found")]
    IngredientNotFound(i64),

    #[error("unknown ingredient ids: {0:?}")]
    UnknownIngredients(Vec<i64>),

    #[error("ingredient is referenced by at least one pizza")]
    IngredientInUse,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub mod users {
    use super::*;

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_staff, is_superuser
             FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        password_hash: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, is_staff, is_superuser)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(is_staff)
        .bind(is_superuser)
        .execute(pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_staff,
            is_superuser,
        })
    }
}

pub mod ingredients {
    use super::*;

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Ingredient>, StoreError> {
        let rows = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, category FROM ingredients ORDER BY id",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Ingredient>, StoreError> {
        let row = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, category FROM ingredients WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn get(pool: &SqlitePool, id: i64) -> Result<Ingredient, StoreError> {
        find(pool, id).await?.ok_or(StoreError::IngredientNotFound(id))
    }

    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        category: IngredientCategory,
    ) -> Result<Ingredient, StoreError> {
        let result = sqlx::query("INSERT INTO ingredients (name, category) VALUES (?1, ?2)")
            .bind(name)
            .bind(category.as_str())
            .execute(pool)
            .await?;

        Ok(Ingredient {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            category,
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        name: &str,
        category: IngredientCategory,
    ) -> Result<Ingredient, StoreError> {
        let result = sqlx::query("UPDATE ingredients SET name = ?1, category = ?2 WHERE id = ?3")
            .bind(name)
            .bind(category.as_str())
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::IngredientNotFound(id));
        }

        Ok(Ingredient {
            id,
            name: name.to_string(),
            category,
        })
    }

    /// Delete an ingredient unless any pizza still references it. The guard
    /// is evaluated here, at delete time; it is not maintained incrementally.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), StoreError> {
        if find(pool, id).await?.is_none() {
            return Err(StoreError::IngredientNotFound(id));
        }

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pizza_ingredients WHERE ingredient_id = ?1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        if references > 0 {
            return Err(StoreError::IngredientInUse);
        }

        sqlx::query("DELETE FROM ingredients WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

pub mod pizzas {
    use super::*;

    /// List pizzas together with a live ingredient count. When
    /// `include_inactive` is false only `status = 'active'` rows are
    /// returned.
    pub async fn list_with_counts(
        pool: &SqlitePool,
        include_inactive: bool,
    ) -> Result<Vec<(Pizza, i64)>, StoreError> {
        let base = "SELECT p.id, p.name, p.price, p.status,
                           COUNT(pi.ingredient_id) AS ingredients_count
                    FROM pizzas p
                    LEFT JOIN pizza_ingredients pi ON pi.pizza_id = p.id";
        let sql = if include_inactive {
            format!("{} GROUP BY p.id ORDER BY p.id", base)
        } else {
            format!(
                "{} WHERE p.status = 'active' GROUP BY p.id ORDER BY p.id",
                base
            )
        };

        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let pizza = Pizza::from_row(&row)?;
            let count: i64 = row.try_get("ingredients_count")?;
            out.push((pizza, count));
        }
        Ok(out)
    }

    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Pizza>, StoreError> {
        let row = sqlx::query_as::<_, Pizza>(
            "SELECT id, name, price, status FROM pizzas WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn get(pool: &SqlitePool, id: i64) -> Result<Pizza, StoreError> {
        find(pool, id).await?.ok_or(StoreError::PizzaNotFound(id))
    }

    pub async fn ingredients_of(
        pool: &SqlitePool,
        pizza_id: i64,
    ) -> Result<Vec<Ingredient>, StoreError> {
        let rows = sqlx::query_as::<_, Ingredient>(
            "SELECT i.id, i.name, i.category
             FROM ingredients i
             JOIN pizza_ingredients pi ON pi.ingredient_id = i.id
             WHERE pi.pizza_id = ?1
             ORDER BY i.id",
        )
        .bind(pizza_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Create a pizza and its initial ingredient set in one transaction.
    /// Any unknown ingredient id fails the whole write.
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        price: Decimal,
        status: PizzaStatus,
        ingredient_ids: &[i64],
    ) -> Result<Pizza, StoreError> {
        let desired: HashSet<i64> = ingredient_ids.iter().copied().collect();
        let mut tx = pool.begin().await?;

        require_known_ingredients(&mut tx, &desired).await?;

        let result = sqlx::query("INSERT INTO pizzas (name, price, status) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(price.to_string())
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;
        let id = result.last_insert_rowid();

        for ingredient_id in &desired {
            associate(&mut tx, id, *ingredient_id).await?;
        }

        tx.commit().await?;
        Ok(Pizza {
            id,
            name: name.to_string(),
            price,
            status,
        })
    }

    /// Full replace: scalar fields are overwritten and the ingredient set is
    /// diffed against the desired set, applying only the delta inside the
    /// transaction. Concurrent readers never observe an intermediate empty
    /// set.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        name: &str,
        price: Decimal,
        status: PizzaStatus,
        ingredient_ids: &[i64],
    ) -> Result<Pizza, StoreError> {
        let desired: HashSet<i64> = ingredient_ids.iter().copied().collect();
        let mut tx = pool.begin().await?;

        require_known_ingredients(&mut tx, &desired).await?;

        let result = sqlx::query("UPDATE pizzas SET name = ?1, price = ?2, status = ?3 WHERE id = ?4")
            .bind(name)
            .bind(price.to_string())
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::PizzaNotFound(id));
        }

        let current: HashSet<i64> = sqlx::query_scalar::<_, i64>(
            "SELECT ingredient_id FROM pizza_ingredients WHERE pizza_id = ?1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        for ingredient_id in desired.difference(&current) {
            associate(&mut tx, id, *ingredient_id).await?;
        }
        for ingredient_id in current.difference(&desired) {
            dissociate(&mut tx, id, *ingredient_id).await?;
        }

        tx.commit().await?;
        Ok(Pizza {
            id,
            name: name.to_string(),
            price,
            status,
        })
    }

    /// Idempotent add: both records must exist, but associating an already
    /// associated ingredient is a successful no-op.
    pub async fn add_ingredient(
        pool: &SqlitePool,
        pizza_id: i64,
        ingredient_id: i64,
    ) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;
        require_pizza(&mut tx, pizza_id).await?;
        require_ingredient(&mut tx, ingredient_id).await?;
        associate(&mut tx, pizza_id, ingredient_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Idempotent remove: both records must exist; removing an ingredient
    /// that is not associated is a successful no-op.
    pub async fn remove_ingredient(
        pool: &SqlitePool,
        pizza_id: i64,
        ingredient_id: i64,
    ) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;
        require_pizza(&mut tx, pizza_id).await?;
        require_ingredient(&mut tx, ingredient_id).await?;
        dissociate(&mut tx, pizza_id, ingredient_id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn associate(
        conn: &mut SqliteConnection,
        pizza_id: i64,
        ingredient_id: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR IGNORE INTO pizza_ingredients (pizza_id, ingredient_id) VALUES (?1, ?2)",
        )
        .bind(pizza_id)
        .bind(ingredient_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn dissociate(
        conn: &mut SqliteConnection,
        pizza_id: i64,
        ingredient_id: i64,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM pizza_ingredients WHERE pizza_id = ?1 AND ingredient_id = ?2")
            .bind(pizza_id)
            .bind(ingredient_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn require_pizza(conn: &mut SqliteConnection, id: i64) -> Result<(), StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM pizzas WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        found.map(|_| ()).ok_or(StoreError::PizzaNotFound(id))
    }

    async fn require_ingredient(conn: &mut SqliteConnection, id: i64) -> Result<(), StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        found.map(|_| ()).ok_or(StoreError::IngredientNotFound(id))
    }

    /// Every desired id must resolve to an existing ingredient, otherwise the
    /// caller's write is rejected wholesale.
    async fn require_known_ingredients(
        conn: &mut SqliteConnection,
        desired: &HashSet<i64>,
    ) -> Result<(), StoreError> {
        if desired.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; desired.len()].join(", ");
        let sql = format!(
            "SELECT id FROM ingredients WHERE id IN ({})",
            placeholders
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for id in desired {
            query = query.bind(*id);
        }
        let known: HashSet<i64> = query.fetch_all(conn).await?.into_iter().collect();

        let mut unknown: Vec<i64> = desired.difference(&known).copied().collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            unknown.sort_unstable();
            Err(StoreError::UnknownIngredients(unknown))
        }
    }
}
