//! Wire representations for the catalog. Prices travel as strings with
//! exactly two decimal places; counts are computed at serialization time,
//! never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::database::models::ingredient::{Ingredient, IngredientCategory};
use crate::database::models::pizza::{Pizza, PizzaStatus};
use crate::error::ApiError;

/// List/summary representation of a pizza.
#[derive(Debug, Serialize)]
pub struct PizzaSummary {
    pub name: String,
    pub price: String,
    pub ingredients_count: i64,
    pub status: PizzaStatus,
}

impl PizzaSummary {
    pub fn from_record(pizza: &Pizza, ingredients_count: i64) -> Self {
        Self {
            name: pizza.name.clone(),
            price: format_price(pizza.price),
            ingredients_count,
            status: pizza.status,
        }
    }
}

/// Detail representation, with the ingredient list expanded.
#[derive(Debug, Serialize)]
pub struct PizzaDetail {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub status: PizzaStatus,
    pub ingredients: Vec<Ingredient>,
}

impl PizzaDetail {
    pub fn from_record(pizza: &Pizza, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: pizza.id,
            name: pizza.name.clone(),
            price: format_price(pizza.price),
            status: pizza.status,
            ingredients,
        }
    }
}

/// Write payload for create and full-replace update.
#[derive(Debug, Deserialize)]
pub struct PizzaWrite {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub status: PizzaStatus,
    #[serde(default)]
    pub ingredients: Vec<i64>,
}

impl PizzaWrite {
    /// Validate and normalize the price to scale 2. The ingredient ids are
    /// checked against the store inside the write transaction, not here.
    pub fn validated_price(&self) -> Result<Decimal, ApiError> {
        if self.price.is_sign_negative() {
            return Err(price_error("price must not be negative"));
        }
        if self.price.normalize().scale() > 2 {
            return Err(price_error("price must have at most 2 decimal places"));
        }
        let mut price = self.price;
        price.rescale(2);
        Ok(price)
    }
}

/// Write payload for ingredients.
#[derive(Debug, Deserialize)]
pub struct IngredientWrite {
    pub name: String,
    #[serde(default)]
    pub category: IngredientCategory,
}

pub fn format_price(price: Decimal) -> String {
    format!("{:.2}", price)
}

fn price_error(message: &str) -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert("price".to_string(), message.to_string());
    ApiError::validation_error("Invalid price", Some(field_errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn write(price: &str) -> PizzaWrite {
        PizzaWrite {
            name: "Margherita".to_string(),
            price: Decimal::from_str(price).unwrap(),
            status: PizzaStatus::default(),
            ingredients: vec![],
        }
    }

    #[test]
    fn summary_renders_price_with_two_decimals() {
        let pizza = Pizza {
            id: 1,
            name: "Margherita".to_string(),
            price: Decimal::from_str("10.5").unwrap(),
            status: PizzaStatus::Active,
        };
        let summary = PizzaSummary::from_record(&pizza, 2);
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["name"], "Margherita");
        assert_eq!(value["price"], "10.50");
        assert_eq!(value["ingredients_count"], 2);
        assert_eq!(value["status"], "active");
    }

    #[test]
    fn detail_expands_ingredients() {
        let pizza = Pizza {
            id: 7,
            name: "Margherita".to_string(),
            price: Decimal::from_str("10.50").unwrap(),
            status: PizzaStatus::Inactive,
        };
        let detail = PizzaDetail::from_record(
            &pizza,
            vec![Ingredient {
                id: 3,
                name: "Tomato".to_string(),
                category: IngredientCategory::Basic,
            }],
        );
        let value = serde_json::to_value(&detail).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["status"], "inactive");
        assert_eq!(value["ingredients"][0]["name"], "Tomato");
        assert_eq!(value["ingredients"][0]["category"], "basic");
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(write("-1.00").validated_price().is_err());
    }

    #[test]
    fn more_than_two_decimal_places_is_rejected() {
        assert!(write("10.505").validated_price().is_err());
        // Trailing zeros beyond scale 2 are harmless
        assert_eq!(
            write("10.500").validated_price().unwrap(),
            Decimal::from_str("10.50").unwrap()
        );
    }

    #[test]
    fn price_is_normalized_to_scale_two() {
        let price = write("12").validated_price().unwrap();
        assert_eq!(format_price(price), "12.00");
    }

    #[test]
    fn write_payload_defaults() {
        let w: PizzaWrite =
            serde_json::from_value(serde_json::json!({"name": "Bianca", "price": "9.00"})).unwrap();
        assert_eq!(w.status, PizzaStatus::Active);
        assert!(w.ingredients.is_empty());
    }

    #[test]
    fn unknown_status_value_is_rejected_by_serde() {
        let result: Result<PizzaWrite, _> = serde_json::from_value(serde_json::json!({
            "name": "Bianca",
            "price": "9.00",
            "status": "retired"
        }));
        assert!(result.is_err());
    }
}
