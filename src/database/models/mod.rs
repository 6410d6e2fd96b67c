pub mod category;
pub mod client;
pub mod item_order;
pub mod order;
pub mod product;
pub mod user;

pub use category::Category;
pub use client::Client;
pub use item_order::ItemOrder;
pub use order::Order;
pub use product::Product;
pub use user::User;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Required text fields reject the empty string with the message the rest
/// of the API reports for it.
pub fn required_text(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        let mut err = ValidationError::new("empty");
        err.message = Some("is not allowed to be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Monetary payload fields follow the original catalog rules: strictly
/// positive, at most two fractional digits.
pub fn positive_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        let mut err = ValidationError::new("positive");
        err.message = Some("must be a positive number".into());
        return Err(err);
    }
    if value.scale() > 2 {
        let mut err = ValidationError::new("precision");
        err.message = Some("must have at most 2 decimal places".into());
        return Err(err);
    }
    Ok(())
}
