//! # orderflow-core: Pure Business Logic for orderflow
//!
//! Domain types and rules for the order lifecycle, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        orderflow Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Transport adapter (HTTP, CLI, ...) - external          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   orderflow-service: OrderLifecycle, ProductCatalog, ApiError   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ orderflow-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌────────────┐ ┌──────────┐ ┌────────────┐      │   │
//! │  │   │  types   │ │ transition │ │   saga   │ │ validation │      │   │
//! │  │   │  Order   │ │ pay/cancel │ │ compen-  │ │   rules    │      │   │
//! │  │   │ Product  │ │  decide()  │ │  sation  │ │   checks   │      │   │
//! │  │   └──────────┘ └────────────┘ └──────────┘ └────────────┘      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      orderflow-db: SQLite product ledger and order store        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Role, Principal)
//! - [`money`] - Integer money with checked order arithmetic
//! - [`transition`] - Order status state machine
//! - [`saga`] - Reservation log for compensating failed order creation
//! - [`draft`] - Price-snapshot accumulation of order lines
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use orderflow_core::transition::{decide, Transition};
//! use orderflow_core::{OrderAction, OrderStatus};
//!
//! let t = decide("order-1", OrderStatus::Paid, OrderAction::Pay).unwrap();
//! assert_eq!(t, Transition::Unchanged(OrderStatus::Paid));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod money;
pub mod saga;
pub mod transition;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum product name length, in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
