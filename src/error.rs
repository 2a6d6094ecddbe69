/*
 * Responsibility
 * - Request-scoped AppError (every failure of a request ends up here)
 * - IntoResponse: HTTP status + fixed plain-text body
 * - Conversion from token verification errors
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::auth::AccessJwtError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Server error: JWT secret not configured")]
    JwtSecretMissing,
    #[error("Bad Request: {0}")]
    BadRequest(&'static str),
    #[error("File not found or access denied.")]
    NotFound,
    #[error("Forbidden: You do not own this file.")]
    Forbidden,
    #[error("Error generating signed URL.")]
    SignedUrl,
    #[error("Internal Server Error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::JwtSecretMissing | AppError::SignedUrl | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<AccessJwtError> for AppError {
    fn from(e: AccessJwtError) -> Self {
        match e {
            AccessJwtError::SecretNotConfigured => AppError::JwtSecretMissing,
            _ => AppError::Unauthorized,
        }
    }
}
