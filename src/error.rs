use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot authenticate user")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Too many open streams")]
    TooManySessions,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Cannot authenticate user".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::TooManySessions => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Too many open streams".to_string(),
            ),
        };

        let body = json!({
            "error": error_message,
        });

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;
