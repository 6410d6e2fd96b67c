use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// List responses pair the page of rows with the total matching count.
#[derive(Debug, Serialize)]
pub struct ListBody<T: Serialize> {
    pub data: Vec<T>,
    pub count: i64,
}

/// Wrapper carrying a payload plus its HTTP status.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: Option<T>,
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a JSON body
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    /// 201 Created with the created object
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            status: StatusCode::CREATED,
        }
    }

    /// 200 OK with an empty body (successful deletes)
    pub fn empty() -> Self {
        Self {
            data: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.data {
            Some(data) => (self.status, Json(data)).into_response(),
            None => self.status.into_response(),
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
