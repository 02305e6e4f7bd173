use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::order::{ErrorKind, OrderError};

// ============================================================================
// API Errors - Mapping engine failures onto HTTP responses
// ============================================================================
//
// Every error body is {"message": "..."}. Internal failures are logged with
// their detail and reported to the client with a generic message.
//
// ============================================================================

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller identity headers missing or malformed
    #[error("{0}")]
    Unauthenticated(String),

    /// Caller is known but may not perform the operation
    #[error("{0}")]
    Forbidden(String),

    /// Request could not be decoded
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Order(#[from] OrderError),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Order(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Validation | ErrorKind::BusinessRule => StatusCode::BAD_REQUEST,
                ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorBody { message })
    }
}
