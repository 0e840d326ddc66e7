use crate::models::ErrorResponse;
use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use std::fmt::Display;
use thiserror::Error;
use validator::ValidationErrors;

/// Errors returned by HTTP handlers
///
/// Everything a handler can fail with ends up as one of these three, and
/// each renders as a JSON [`ErrorResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// Internal failure with a generic message
    ///
    /// The source error is always logged; it is only echoed to the client
    /// when `expose_details` is set.
    pub fn internal(message: impl Into<String>, source: &dyn Display, expose_details: bool) -> Self {
        let message = message.into();
        tracing::error!("{}: {}", message, source);
        ApiError::Internal {
            message,
            details: expose_details.then(|| source.to_string()),
        }
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        ApiError::BadRequest(
            errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| match &e.message {
                        Some(msg) => msg.to_string(),
                        None => format!("{} is invalid", field),
                    })
                })
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            ApiError::Internal { details, .. } => details.clone(),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.label().to_string(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
            details,
        })
    }
}

/// Handle JSON payload errors
pub fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::BadRequest(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query string error on {}: {}", req.path(), err);
    ApiError::BadRequest(format!("Invalid query: {}", err)).into()
}
