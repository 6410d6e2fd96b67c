use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::positive_price;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemOrder {
    pub id: i32,
    #[serde(rename = "order")]
    pub order_id: Option<i32>,
    #[serde(rename = "product")]
    pub product_id: Option<i32>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemOrder {
    pub const TABLE: &'static str = "item_orders";
    pub const SEARCHABLE: &'static [&'static str] = &["products.description"];
    pub const ORDER_BY: &'static str = "item_orders.id";
    pub const PRODUCT_JOIN: &'static str =
        "JOIN products ON products.id = item_orders.product_id";
    pub const VIEW_COLUMNS: &'static str =
        "item_orders.id, item_orders.order_id, item_orders.product_id, \
         products.description AS product_description, \
         item_orders.unit_price, item_orders.quantity, \
         item_orders.created_at, item_orders.updated_at";
}

/// Line item joined with its product, as fetched for presentation.
#[derive(Debug, Clone, FromRow)]
pub struct ItemOrderWithProduct {
    pub id: i32,
    pub order_id: Option<i32>,
    pub product_id: Option<i32>,
    pub product_description: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Presentation view with the derived line value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOrderView {
    pub id: i32,
    #[serde(rename = "order")]
    pub order_id: Option<i32>,
    #[serde(rename = "product")]
    pub product_id: Option<i32>,
    pub product_description: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    /// unit_price * quantity, computed at read time.
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemOrderView {
    pub fn compose(row: ItemOrderWithProduct) -> Self {
        let value = row.unit_price * Decimal::from(row.quantity);
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_description: row.product_description,
            unit_price: row.unit_price,
            quantity: row.quantity,
            value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemOrder {
    pub order: i32,
    pub product: i32,

    #[validate(custom(function = positive_price))]
    pub unit_price: Decimal,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemOrder {
    pub product: Option<i32>,

    #[validate(custom(function = positive_price))]
    pub unit_price: Option<Decimal>,

    #[validate(range(min = 1, message = "must be a positive number"))]
    pub quantity: Option<i32>,
}
