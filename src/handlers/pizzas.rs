use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::api::format::{PizzaDetail, PizzaSummary, PizzaWrite};
use crate::database::models::pizza::PizzaStatus;
use crate::database::repository::pizzas;
use crate::error::ApiError;
use crate::middleware::auth::{AdminIdentity, MaybeIdentity};
use crate::AppState;

/// GET /pizzas/ - list per the visibility policy: admins see every status,
/// everyone else only active pizzas.
pub async fn list(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Result<Json<Vec<PizzaSummary>>, ApiError> {
    let include_inactive = identity
        .map(|caller| caller.has_admin_capability())
        .unwrap_or(false);

    let rows = pizzas::list_with_counts(&state.pool, include_inactive).await?;
    let summaries = rows
        .iter()
        .map(|(pizza, count)| PizzaSummary::from_record(pizza, *count))
        .collect();
    Ok(Json(summaries))
}

/// GET /pizzas/:id/ - detail view. An inactive pizza is a permission error
/// for non-admin callers, not a not-found: its existence is not hidden,
/// only its content.
pub async fn detail(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<i64>,
) -> Result<Json<PizzaDetail>, ApiError> {
    let pizza = pizzas::get(&state.pool, id).await?;

    if pizza.status == PizzaStatus::Inactive
        && !identity
            .map(|caller| caller.has_admin_capability())
            .unwrap_or(false)
    {
        return Err(ApiError::forbidden(
            "You do not have permission to view inactive pizzas",
        ));
    }

    let ingredients = pizzas::ingredients_of(&state.pool, id).await?;
    Ok(Json(PizzaDetail::from_record(&pizza, ingredients)))
}

/// POST /pizzas/create/ - create a pizza with its initial ingredient set
pub async fn create(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Json(payload): Json<PizzaWrite>,
) -> Result<(StatusCode, Json<PizzaDetail>), ApiError> {
    let price = payload.validated_price()?;

    let pizza = pizzas::create(
        &state.pool,
        &payload.name,
        price,
        payload.status,
        &payload.ingredients,
    )
    .await?;

    let ingredients = pizzas::ingredients_of(&state.pool, pizza.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(PizzaDetail::from_record(&pizza, ingredients)),
    ))
}

/// PUT /pizzas/:id/update/ - full replace, ingredient set included
pub async fn update(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PizzaWrite>,
) -> Result<Json<PizzaDetail>, ApiError> {
    let price = payload.validated_price()?;

    let pizza = pizzas::update(
        &state.pool,
        id,
        &payload.name,
        price,
        payload.status,
        &payload.ingredients,
    )
    .await?;

    let ingredients = pizzas::ingredients_of(&state.pool, id).await?;
    Ok(Json(PizzaDetail::from_record(&pizza, ingredients)))
}

/// POST /pizzas/:id/add_ingredient/:ingredient_id/ - idempotent add
pub async fn add_ingredient(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Path((id, ingredient_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    pizzas::add_ingredient(&state.pool, id, ingredient_id).await?;
    Ok(Json(json!({ "status": "ingredient added" })))
}

/// DELETE /pizzas/:id/remove_ingredient/:ingredient_id/ - idempotent remove
pub async fn remove_ingredient(
    AdminIdentity(_caller): AdminIdentity,
    State(state): State<AppState>,
    Path((id, ingredient_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    pizzas::remove_ingredient(&state.pool, id, ingredient_id).await?;
    Ok(Json(json!({ "status": "ingredient removed" })))
}
