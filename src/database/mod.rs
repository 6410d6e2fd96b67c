pub mod aggregate;
pub mod models;
pub mod pool;
pub mod repository;
pub mod scope;

use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                // unique_violation: surface the constraint message
                Some("23505") => return DbError::Conflict(db_err.message().to_string()),
                // foreign_key_violation: the referenced row does not exist
                Some("23503") => return DbError::InvalidReference(db_err.message().to_string()),
                _ => {}
            }
        }
        DbError::Sqlx(err)
    }
}

impl DbError {
    pub fn not_found() -> Self {
        DbError::NotFound("Record not found".to_string())
    }
}
