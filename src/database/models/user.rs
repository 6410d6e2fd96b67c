use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::auth::password_policy;

use super::required_text;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash; never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub const TABLE: &'static str = "users";
    pub const SEARCHABLE: &'static [&'static str] = &["username", "email"];
    pub const ORDER_BY: &'static str = "username";
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(
        custom(function = required_text),
        length(max = 40, message = "length must be at most 40 characters long")
    )]
    pub username: String,

    #[validate(
        custom(function = required_text),
        length(max = 100, message = "length must be at most 100 characters long")
    )]
    pub first_name: String,

    #[validate(
        custom(function = required_text),
        length(max = 50, message = "length must be at most 50 characters long")
    )]
    pub last_name: String,

    #[validate(
        email(message = "must be a valid email"),
        length(max = 120, message = "length must be at most 120 characters long")
    )]
    pub email: String,

    #[validate(custom(function = password_policy))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(
        custom(function = required_text),
        length(max = 40, message = "length must be at most 40 characters long")
    )]
    pub username: Option<String>,

    #[validate(
        custom(function = required_text),
        length(max = 100, message = "length must be at most 100 characters long")
    )]
    pub first_name: Option<String>,

    #[validate(
        custom(function = required_text),
        length(max = 50, message = "length must be at most 50 characters long")
    )]
    pub last_name: Option<String>,

    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,

    #[validate(custom(function = password_policy))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct Login {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,

    #[validate(custom(function = required_text))]
    pub password: String,
}
