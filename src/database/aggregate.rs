//! Order total aggregation.
//!
//! Totals are derived, never stored: the sum of `unit_price * quantity`
//! over an order's current line items, recomputed on every read. All
//! arithmetic happens in NUMERIC on the database side and `Decimal` on the
//! Rust side. An order with no line items totals 0.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::database::DbError;

/// Total for a single order.
pub async fn order_total(pool: &PgPool, order_id: i32) -> Result<Decimal, DbError> {
    let row: (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(unit_price * quantity), 0) FROM item_orders WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Totals for a page of orders in one grouped aggregate, instead of one
/// query per order. Orders without line items are absent from the map;
/// read them out with [`total_for`].
pub async fn order_totals(
    pool: &PgPool,
    order_ids: &[i32],
) -> Result<HashMap<i32, Decimal>, DbError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, Decimal)> = sqlx::query_as(
        "SELECT order_id, SUM(unit_price * quantity) FROM item_orders \
         WHERE order_id = ANY($1) GROUP BY order_id",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Resolve one order's total out of a batched result.
pub fn total_for(totals: &HashMap<i32, Decimal>, order_id: i32) -> Decimal {
    totals.get(&order_id).copied().unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_orders_total_zero() {
        let mut totals = HashMap::new();
        totals.insert(1, Decimal::new(900, 2));

        assert_eq!(total_for(&totals, 1), Decimal::new(900, 2));
        assert_eq!(total_for(&totals, 2), Decimal::ZERO);
    }

    #[test]
    fn decimal_line_arithmetic_is_exact() {
        // (2.00 * 3) + (1.50 * 2) = 9.00
        let a = Decimal::new(200, 2) * Decimal::from(3);
        let b = Decimal::new(150, 2) * Decimal::from(2);
        assert_eq!(a + b, Decimal::new(900, 2));
    }
}
