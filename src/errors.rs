// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Only the resource failures escalate past the site finder.
/// "No competitors" and "no search space" are regular outcomes, and road
/// snapping / map reporting failures are absorbed where they happen.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Geometry error: {0}")]
    GeometryError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),
}

impl SiteError {
    fn error_code(&self) -> &'static str {
        match self {
            SiteError::NotFound(_) => "NOT_FOUND",
            SiteError::DatabaseError(_) => "DATABASE_ERROR",
            SiteError::GeometryError(_) => "GEOMETRY_ERROR",
            SiteError::InvalidInput(_) => "INVALID_INPUT",
            SiteError::ValidationError(_) => "VALIDATION_ERROR",
            SiteError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
        }
    }
}

/// Convert SiteError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for SiteError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            SiteError::NotFound(_) => StatusCode::NOT_FOUND,
            SiteError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiteError::GeometryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiteError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SiteError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SiteError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
