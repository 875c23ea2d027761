//! # Service and API Error Types
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in orderflow                              │
//! │                                                                         │
//! │  OrderLifecycle / ProductCatalog                                       │
//! │  Result<T, ServiceError>                                               │
//! │         │                                                               │
//! │         ├── CoreError (stock, status, not found) ──┐                   │
//! │         │                                          │                   │
//! │         └── DbError (sqlx, constraints) ───────────┤                   │
//! │                                                    ▼                   │
//! │                                   ApiError::from_service(err, env)     │
//! │                                   { code: "CONFLICT", message }        │
//! │                                                    │                   │
//! │                                                    ▼                   │
//! │                                   transport adapter → HTTP status      │
//! │                                   (ErrorCode::http_status)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged in full; in production the caller only gets
//! a generic message.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::Environment;
use orderflow_core::{CoreError, ErrorKind, ValidationError};
use orderflow_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Business rule failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl ServiceError {
    /// Caller-facing classification.
    ///
    /// Storage errors are internal, except constraint violations that a
    /// caller can cause with bad input.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Core(err) => err.kind(),
            ServiceError::Db(DbError::NotFound { .. }) => ErrorKind::NotFound,
            ServiceError::Db(DbError::CheckViolation { .. })
            | ServiceError::Db(DbError::ForeignKeyViolation { .. }) => ErrorKind::Validation,
            ServiceError::Db(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// Error body handed to the transport adapter.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Cannot pay a cancelled order: 6f1c..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Not authenticated (401)
    Unauthorized,

    /// Authenticated but wrong role (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Illegal or concurrently lost state transition (409)
    Conflict,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status the transport adapter should answer with.
    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::Internal => 500,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::Unauthorized => ErrorCode::Unauthorized,
            ErrorKind::Forbidden => ErrorCode::Forbidden,
            ErrorKind::Internal => ErrorCode::Internal,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates an unauthenticated error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates a wrong-role error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error.
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Converts a service error into a response body.
    ///
    /// Non-internal errors keep their message: it names the offending entity.
    /// Internal errors are always logged; in production the message is
    /// replaced.
    pub fn from_service(err: &ServiceError, environment: Environment) -> Self {
        let code = ErrorCode::from(err.kind());

        if code == ErrorCode::Internal {
            error!(error = %err, "Internal error");
            if environment.is_production() {
                return ApiError::internal("An unexpected error occurred");
            }
        }

        ApiError::new(code, err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::from_service(&err, Environment::Development)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::{OrderAction, OrderStatus};

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::ValidationError.http_status(), 400);
        assert_eq!(ErrorCode::Unauthorized.http_status(), 401);
        assert_eq!(ErrorCode::Forbidden.http_status(), 403);
        assert_eq!(ErrorCode::NotFound.http_status(), 404);
        assert_eq!(ErrorCode::Conflict.http_status(), 409);
        assert_eq!(ErrorCode::Internal.http_status(), 500);
    }

    #[test]
    fn test_conflict_keeps_message() {
        let err = ServiceError::from(CoreError::InvalidOrderStatus {
            order_id: "o-1".to_string(),
            current: OrderStatus::Cancelled,
            action: OrderAction::Pay,
        });
        let api = ApiError::from_service(&err, Environment::Production);
        assert_eq!(api.code, ErrorCode::Conflict);
        assert_eq!(api.message, "Cannot pay a cancelled order: o-1");
    }

    #[test]
    fn test_internal_redacted_in_production() {
        let err = ServiceError::from(DbError::QueryFailed("disk I/O error".to_string()));

        let prod = ApiError::from_service(&err, Environment::Production);
        assert_eq!(prod.code, ErrorCode::Internal);
        assert!(!prod.message.contains("disk"));

        let dev = ApiError::from_service(&err, Environment::Development);
        assert!(dev.message.contains("disk I/O error"));
    }

    #[test]
    fn test_db_constraint_kinds() {
        let fk = ServiceError::from(DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        });
        assert_eq!(fk.kind(), ErrorKind::Validation);
        assert_eq!(
            ServiceError::from(DbError::not_found("Product", "p")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ServiceError::from(DbError::PoolExhausted).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_serialized_shape() {
        let api = ApiError::new(ErrorCode::NotFound, "Order not found: o-9");
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: o-9");
    }
}
