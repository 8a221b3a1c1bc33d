use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;

/// Pizza lifecycle status. Only these two values are ever accepted at the
/// write boundary; the storage column itself is plain TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PizzaStatus {
    Active,
    Inactive,
}

impl Default for PizzaStatus {
    fn default() -> Self {
        PizzaStatus::Active
    }
}

impl PizzaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PizzaStatus::Active => "active",
            PizzaStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for PizzaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PizzaStatus::Active),
            "inactive" => Ok(PizzaStatus::Inactive),
            other => Err(format!("invalid pizza status: {}", other)),
        }
    }
}

impl std::fmt::Display for PizzaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pizza {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub status: PizzaStatus,
}

// Manual row mapping: price is stored as canonical decimal TEXT and status
// as TEXT, so both need fallible conversion.
impl<'r> FromRow<'r, SqliteRow> for Pizza {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let price_text: String = row.try_get("price")?;
        let price = Decimal::from_str(&price_text).map_err(|e| sqlx::Error::ColumnDecode {
            index: "price".to_string(),
            source: Box::new(e),
        })?;

        let status_text: String = row.try_get("status")?;
        let status = PizzaStatus::from_str(&status_text).map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price,
            status,
        })
    }
}
