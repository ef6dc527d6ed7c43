//! User-related error types
//!
//! `UserError` is the single translation boundary between the store, the
//! token service, the media gateway and the HTTP envelope.

use crate::utils::response_handler::ErrorEnvelope;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Message shown to clients whenever the real cause stays server-side.
pub const INTERNAL_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Upload(String),

    #[error("User not found")]
    UserNotFound,

    /// Holds the server-side diagnostic; never rendered to clients.
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn validation(message: impl Into<String>) -> Self {
        UserError::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        UserError::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::Conflict(_) => StatusCode::CONFLICT,
            UserError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            UserError::Upload(_) => StatusCode::BAD_REQUEST,
            UserError::UserNotFound => StatusCode::NOT_FOUND,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            UserError::Validation(_) => "VALIDATION_ERROR",
            UserError::Conflict(_) => "EMAIL_TAKEN",
            UserError::Unauthorized(_) => "UNAUTHORIZED",
            UserError::Upload(_) => "UPLOAD_FAILED",
            UserError::UserNotFound => "USER_NOT_FOUND",
            UserError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to hand to a client
    pub fn public_message(&self) -> String {
        match self {
            UserError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.status_code().as_u16(), self.error_code(), self.public_message())
    }
}

impl ResponseError for UserError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        if let UserError::Internal(diagnostic) = self {
            log::error!("{diagnostic}");
        }
        HttpResponse::build(self.status_code()).json(self.to_envelope())
    }
}

impl From<sqlx::Error> for UserError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                UserError::Conflict("User email already exists.".to_string())
            },
            _ => UserError::Internal(format!("Database error: {error}")),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for UserError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        UserError::Internal(format!("Token error: {error}"))
    }
}
