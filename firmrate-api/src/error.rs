/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`, which converts to the
/// appropriate status code and a JSON error body.
///
/// The taxonomy follows the workflows: validation, not-found, conflict
/// (duplicate email / company name), authorization, and the time-boundary
/// violation `EditWindowExpired` — kept distinct from generic validation so
/// tests can target it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use firmrate_shared::models::review::EDIT_WINDOW_DAYS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - missing or invalid credentials
    Unauthorized(String),

    /// Forbidden (403) - authenticated but not allowed
    Forbidden(String),

    /// Not found (404) - referenced company/review/user absent
    NotFound(String),

    /// Conflict (409) - duplicate email or company name
    Conflict(String),

    /// Edit window expired (403, distinct error code)
    ///
    /// The owner tried to edit or withdraw a review more than the allowed
    /// number of days after its timestamp.
    EditWindowExpired,

    /// Unprocessable entity (422) - field validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "edit_window_expired")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::EditWindowExpired => write!(f, "Edit window expired"),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::EditWindowExpired => (
                StatusCode::FORBIDDEN,
                "edit_window_expired",
                format!(
                    "Toto hodnocení již nemůžete upravit. Doba na úpravu hodnocení je {} dny.",
                    EDIT_WINDOW_DAYS
                ),
                None,
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations become user-facing conflicts; the
/// constraint name tells us whether a duplicate email or company name was
/// attempted. Everything else is internal.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict(
                            "Tato emailová adresa je již používána".to_string(),
                        );
                    }
                    if constraint.contains("companies") && constraint.contains("name") {
                        return ApiError::Conflict(
                            "Toto jméno společnosti již je používáno".to_string(),
                        );
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator failures to the field-detail form
impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    }
}

/// Convert authorization errors to API errors
impl From<firmrate_shared::auth::authorization::AuthzError> for ApiError {
    fn from(err: firmrate_shared::auth::authorization::AuthzError) -> Self {
        use firmrate_shared::auth::authorization::AuthzError;
        match err {
            AuthzError::NotAdmin => ApiError::Forbidden("Nepovolený přístup".to_string()),
            AuthzError::NotOwner => {
                ApiError::Forbidden("Not authorized to access this resource".to_string())
            }
            AuthzError::DatabaseError(e) => {
                ApiError::InternalError(format!("Database error: {}", e))
            }
        }
    }
}

/// Convert password errors to API errors
impl From<firmrate_shared::auth::password::PasswordError> for ApiError {
    fn from(err: firmrate_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<firmrate_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: firmrate_shared::auth::jwt::JwtError) -> Self {
        use firmrate_shared::auth::jwt::JwtError;
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert email validation errors to the field-detail form
impl From<firmrate_shared::email::EmailError> for ApiError {
    fn from(err: firmrate_shared::email::EmailError) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: match err {
                firmrate_shared::email::EmailError::Invalid(_) => {
                    "Tato emailová adresa je neplatná".to_string()
                }
                firmrate_shared::email::EmailError::TooLong => {
                    "Emailová adresa je příliš dlouhá".to_string()
                }
            },
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Company not found".to_string());
        assert_eq!(err.to_string(), "Not found: Company not found");

        assert_eq!(ApiError::EditWindowExpired.to_string(), "Edit window expired");
    }

    #[test]
    fn test_validation_error_display() {
        let errors = vec![
            ValidationErrorDetail {
                field: "rating".to_string(),
                message: "Rating must be between 1 and 5".to_string(),
            },
            ValidationErrorDetail {
                field: "body".to_string(),
                message: "Review text too long".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
