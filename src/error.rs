use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid security token")]
    InvalidToken,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyVoted | AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_)
            | AppError::Redis(_)
            | AppError::Internal(_)
            | AppError::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                "Internal server error".to_string()
            }
            AppError::Jwt(ref e) => {
                tracing::error!("JWT error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::InvalidInput(message)
            | AppError::Validation(message)
            | AppError::Authentication(message)
            | AppError::Forbidden(message)
            | AppError::NotFound(message) => message,
            AppError::InvalidToken => "Invalid security token".to_string(),
            AppError::AlreadyVoted => "Already voted".to_string(),
            AppError::RateLimit => "Rate limit exceeded".to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "httpStatus": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

// Validation helper
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();

        AppError::Validation(error_messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_statuses_follow_the_vote_contract() {
        assert_eq!(
            AppError::InvalidInput("bad kind".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Forbidden("not public".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NotFound("missing".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::AlreadyVoted.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
