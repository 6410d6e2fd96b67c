use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::required_text;

/// Persisted order row. The total is not here: it is derived from the
/// line items at read time and lives on [`OrderView`].
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub code: String,
    pub emission: DateTime<Utc>,
    pub delivery: DateTime<Utc>,
    #[serde(rename = "client")]
    pub client_id: Option<i32>,
    #[serde(skip_serializing)]
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub const TABLE: &'static str = "orders";
    pub const ORDER_BY: &'static str = "orders.code";
    /// Search spans the order code and the joined client name.
    pub const SEARCHABLE: &'static [&'static str] = &["orders.code", "clients.name"];
    pub const CLIENT_JOIN: &'static str = "JOIN clients ON clients.id = orders.client_id";
    pub const VIEW_COLUMNS: &'static str =
        "orders.id, orders.code, orders.emission, orders.delivery, \
         orders.client_id, clients.name AS client_name, \
         orders.created_at, orders.updated_at";
}

/// Order joined with its client, as fetched for presentation.
#[derive(Debug, Clone, FromRow)]
pub struct OrderWithClient {
    pub id: i32,
    pub code: String,
    pub emission: DateTime<Utc>,
    pub delivery: DateTime<Utc>,
    pub client_id: Option<i32>,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Presentation view: the persisted fields plus the derived total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i32,
    pub code: String,
    pub emission: DateTime<Utc>,
    pub delivery: DateTime<Utc>,
    #[serde(rename = "client")]
    pub client_id: Option<i32>,
    pub client_name: String,
    pub price_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderView {
    pub fn compose(row: OrderWithClient, price_total: Decimal) -> Self {
        Self {
            id: row.id,
            code: row.code,
            emission: row.emission,
            delivery: row.delivery,
            client_id: row.client_id,
            client_name: row.client_name,
            price_total,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[validate(
        custom(function = required_text),
        length(max = 5, message = "length must be at most 5 characters long")
    )]
    pub code: String,

    pub emission: DateTime<Utc>,
    pub delivery: DateTime<Utc>,
    pub client: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[validate(
        custom(function = required_text),
        length(max = 5, message = "length must be at most 5 characters long")
    )]
    pub code: Option<String>,

    pub emission: Option<DateTime<Utc>>,
    pub delivery: Option<DateTime<Utc>>,
    pub client: Option<i32>,
}
