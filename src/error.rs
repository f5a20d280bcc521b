use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Failures a request handler can surface to the caller.
///
/// Configuration faults are logged with their full detail but only a generic
/// message is returned. Upstream messages are passed through as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidPayload(String),

    #[error("Last message must be from user")]
    LastTurnNotUser,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("server configuration error: {0}")]
    ServerConfiguration(String),

    #[error("{0}")]
    Upstream(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) | ApiError::LastTurnNotUser => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ServerConfiguration(_) | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::ServerConfiguration(detail) => {
                error!("Server configuration error: {}", detail);
                "Server configuration error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
