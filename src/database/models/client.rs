use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::required_text;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub const TABLE: &'static str = "clients";
    pub const SEARCHABLE: &'static [&'static str] = &["name", "last_name", "email"];
    pub const ORDER_BY: &'static str = "name";
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    #[validate(
        custom(function = required_text),
        length(max = 250, message = "length must be at most 250 characters long")
    )]
    pub name: String,

    // May be blank; presence is still required
    pub last_name: String,

    #[validate(
        email(message = "must be a valid email"),
        length(max = 120, message = "length must be at most 120 characters long")
    )]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    #[validate(
        custom(function = required_text),
        length(max = 250, message = "length must be at most 250 characters long")
    )]
    pub name: Option<String>,

    pub last_name: Option<String>,

    #[validate(
        email(message = "must be a valid email"),
        length(max = 120, message = "length must be at most 120 characters long")
    )]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_flagged() {
        let payload = UpdateClient {
            name: Some(String::new()),
            last_name: None,
            email: None,
        };
        let errors = payload.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let messages = field_errors.get("name").unwrap();
        assert_eq!(
            messages[0].message.as_deref(),
            Some("is not allowed to be empty")
        );
    }
}
