//! Handler boundary errors, rendered as `{"error": "..."}`.

use crate::animation::AnimationError;
use crate::params::InvalidParam;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No images provided")]
    MissingInput,

    #[error("At least 2 images required")]
    InsufficientFrames,

    #[error("Invalid value for {name}: {value:?} is not a valid integer")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Malformed upload: {message}")]
    MalformedRequest { status: StatusCode, message: String },

    #[error("Failed to create GIF: {0}")]
    CodecFailure(#[source] AnimationError),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InvalidParam> for ApiError {
    fn from(param: InvalidParam) -> Self {
        ApiError::InvalidParameter {
            name: param.name,
            value: param.value,
        }
    }
}

impl From<AnimationError> for ApiError {
    fn from(error: AnimationError) -> Self {
        match error {
            AnimationError::TooFewFrames(_) => ApiError::InsufficientFrames,
            other => ApiError::CodecFailure(other),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        ApiError::MalformedRequest {
            status: error.status(),
            message: error.body_text(),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingInput
            | ApiError::InsufficientFrames
            | ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::MalformedRequest { status, .. } => *status,
            ApiError::CodecFailure(_) | ApiError::Storage(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
