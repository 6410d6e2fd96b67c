use axum::extract::{FromRequest, Request};
use axum::Json;
use std::collections::HashMap;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// JSON extractor that runs the payload's `validator` rules before the
/// handler sees it, so malformed input never reaches the repository layer.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        payload.validate().map_err(validation_error)?;
        Ok(ValidatedJson(payload))
    }
}

/// Flatten `validator` output into a field → message map, keyed by the wire
/// (camelCase) field names.
pub fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut field_errors = HashMap::new();
    for (field, field_failures) in errors.field_errors() {
        if let Some(first) = field_failures.first() {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            field_errors.insert(camel_case(&field), message);
        }
    }
    ApiError::validation_error("Invalid request payload", field_errors)
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
