//! # Error Types
//!
//! Domain-specific error types for orderflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderflow-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Caller-facing classification                   │
//! │                                                                         │
//! │  orderflow-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  orderflow-service errors                                              │
//! │  ├── ServiceError     - CoreError | DbError                            │
//! │  └── ApiError         - What transport adapters serialize              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, order ID, missing IDs)
//! 3. Errors are enum variants, never String
//! 4. Every variant has exactly one [`ErrorKind`]

use serde::Serialize;
use thiserror::Error;

use crate::types::{OrderAction, OrderStatus};

// =============================================================================
// Error Kind
// =============================================================================

/// Classification of a failure, independent of transport.
///
/// ```text
/// Validation    → caller can fix the request and retry
/// NotFound      → referenced product or order does not exist
/// Conflict      → illegal or concurrently lost transition; don't retry unchanged
/// Unauthorized  → upstream authentication failed
/// Forbidden     → upstream role check failed
/// Internal      → unexpected failure (storage, invariant breach)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more requested products do not exist.
    ///
    /// ## When This Occurs
    /// - Order request references an unknown product id
    /// - Product was removed between catalog read and order placement
    #[error("Products not found: {}", .ids.join(", "))]
    ProductsNotFound { ids: Vec<String> },

    /// A single product lookup failed.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Not enough stock to reserve the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Create order (Keyboard × 5)
    ///      │
    ///      ▼
    /// Snapshot stock: 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Keyboard", available: 3, requested: 5 }
    /// ```
    ///
    /// `available` comes from the batch snapshot read before reservation and
    /// may be stale under contention.
    #[error("Insufficient stock for product {product}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The snapshot said there was enough stock, but the atomic decrement
    /// found otherwise (another order got there first).
    #[error("Failed to reserve stock for product {product}. Please try again.")]
    ReservationFailed { product: String },

    /// The order's current status does not allow the requested action.
    ///
    /// ## When This Occurs
    /// - Paying a cancelled order
    #[error("Cannot {action} a {current} order: {order_id}")]
    InvalidOrderStatus {
        order_id: String,
        current: OrderStatus,
        action: OrderAction,
    },

    /// The order changed status between the read and the guarded write.
    #[error("Order {order_id} was modified concurrently, now {current}")]
    ConcurrentModification {
        order_id: String,
        current: OrderStatus,
    },

    /// Order total does not fit in the money representation.
    #[error("Order total exceeds the supported range")]
    TotalOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the caller-facing classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductsNotFound { .. }
            | CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_) => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. }
            | CoreError::ReservationFailed { .. }
            | CoreError::TotalOverflow
            | CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::InvalidOrderStatus { .. } | CoreError::ConcurrentModification { .. } => {
                ErrorKind::Conflict
            }
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must hold at least one element is empty.
    #[error("{field} must contain at least one item")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must be a non-negative integer")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
