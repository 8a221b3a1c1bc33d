use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::format::IngredientWrite;
use crate::database::models::ingredient::Ingredient;
use crate::database::repository::ingredients;
use crate::error::ApiError;
use crate::middleware::auth::AdminIdentity;
use crate::AppState;

/// GET /ingredients/
pub async fn list(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    Ok(Json(ingredients::list(&state.pool).await?))
}

/// POST /ingredients/
pub async fn create(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Json(payload): Json<IngredientWrite>,
) -> Result<(StatusCode, Json<Ingredient>), ApiError> {
    let ingredient = ingredients::create(&state.pool, &payload.name, payload.category).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// GET /ingredients/:id/
pub async fn retrieve(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ingredient>, ApiError> {
    Ok(Json(ingredients::get(&state.pool, id).await?))
}

/// PUT /ingredients/:id/
pub async fn update(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<IngredientWrite>,
) -> Result<Json<Ingredient>, ApiError> {
    let ingredient = ingredients::update(&state.pool, id, &payload.name, payload.category).await?;
    Ok(Json(ingredient))
}

/// DELETE /ingredients/:id/ - refuses to delete an ingredient still
/// referenced by any pizza.
pub async fn delete(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ingredients::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
