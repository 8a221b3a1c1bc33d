use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Basic,
    Premium,
}

impl Default for IngredientCategory {
    fn default() -> Self {
        IngredientCategory::Basic
    }
}

impl IngredientCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Basic => "basic",
            IngredientCategory::Premium => "premium",
        }
    }
}

impl FromStr for IngredientCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(IngredientCategory::Basic),
            "premium" => Ok(IngredientCategory::Premium),
            other => Err(format!("invalid ingredient category: {}", other)),
        }
    }
}

impl std::fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub category: IngredientCategory,
}

impl<'r> FromRow<'r, SqliteRow> for Ingredient {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let category_text: String = row.try_get("category")?;
        let category =
            IngredientCategory::from_str(&category_text).map_err(|e| sqlx::Error::ColumnDecode {
                index: "category".to_string(),
                source: e.into(),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category,
        })
    }
}
