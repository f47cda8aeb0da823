use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Request failures, split by who is at fault.
#[derive(Debug)]
pub enum ApiError {
    /// The payload is malformed or has the wrong shape.
    Validation(String),
    /// The body exceeds the configured size limit.
    PayloadTooLarge(String),
    /// The model or the server failed on a well-formed payload.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

impl From<PredictError> for ApiError {
    fn from(value: PredictError) -> Self {
        if value.is_client_error() {
            Self::Validation(value.to_string())
        } else {
            Self::Internal(value.to_string())
        }
    }
}
