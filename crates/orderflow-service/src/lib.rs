//! # orderflow-service: Order Lifecycle Engine
//!
//! Turns order requests into reserved stock and stored orders, and moves
//! orders through their status machine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  transport adapter (HTTP, CLI, ...) ── authenticated Principal ──┐     │
//! │                                                                  │     │
//! │  ┌───────────────────────────────────────────────────────────────▼──┐  │
//! │  │               orderflow-service (THIS CRATE)                     │  │
//! │  │                                                                  │  │
//! │  │   OrderLifecycle           ProductCatalog        ApiError        │  │
//! │  │   create / pay / cancel    create / update       code + message  │  │
//! │  │   get_orders               list / get            http_status()   │  │
//! │  └──────────────┬──────────────────────┬────────────────────────────┘  │
//! │                 │ rules                │ storage                        │
//! │                 ▼                      ▼                                │
//! │          orderflow-core          orderflow-db                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`lifecycle`] - Order creation, payment and cancellation
//! - [`catalog`] - Product administration
//! - [`error`] - Service errors and the serialized API error
//! - [`config`] - Environment-based configuration
//! - [`telemetry`] - tracing subscriber setup

pub mod catalog;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod telemetry;

pub use catalog::ProductCatalog;
pub use config::{AppConfig, ConfigError, Environment};
pub use error::{ApiError, ErrorCode, ServiceError, ServiceResult};
pub use lifecycle::{Cancellation, OrderLifecycle};
