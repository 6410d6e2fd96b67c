use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{positive_price, required_text};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub reference: String,
    pub description: String,
    pub unit_price: Decimal,
    #[serde(rename = "category")]
    pub category_id: Option<i32>,
    #[serde(skip_serializing)]
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub const TABLE: &'static str = "products";
    pub const SEARCHABLE: &'static [&'static str] = &["reference", "description"];
    pub const ORDER_BY: &'static str = "reference";
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(
        custom(function = required_text),
        length(max = 8, message = "length must be at most 8 characters long")
    )]
    pub reference: String,

    // May be blank; presence is still required
    pub description: String,

    #[validate(custom(function = positive_price))]
    pub unit_price: Decimal,

    pub category: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(
        custom(function = required_text),
        length(max = 8, message = "length must be at most 8 characters long")
    )]
    pub reference: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = positive_price))]
    pub unit_price: Option<Decimal>,

    pub category: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_unit_price() {
        let payload = CreateProduct {
            reference: "001".to_string(),
            description: "description 001".to_string(),
            unit_price: Decimal::ZERO,
            category: 1,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("unit_price"));
    }

    #[test]
    fn rejects_overlong_reference() {
        let payload = CreateProduct {
            reference: "way-too-long".to_string(),
            description: String::new(),
            unit_price: Decimal::new(100, 2),
            category: 1,
        };
        assert!(payload.validate().is_err());
    }
}
