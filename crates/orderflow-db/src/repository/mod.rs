//! # Repository Module
//!
//! Database repository implementations for orderflow.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Their Callers                       │
//! │                                                                         │
//! │  OrderLifecycle / ProductCatalog (orderflow-service)                   │
//! │       │                                                                 │
//! │       │  db.products().decrease_stock(&id, 2)                          │
//! │       │  db.orders().find_for_owner(&user_id)                          │
//! │       ▼                                                                 │
//! │  ProductRepository                 OrderRepository                     │
//! │  ├── insert / list / get_by_id     ├── create                          │
//! │  ├── update                        ├── find_by_id                      │
//! │  ├── find_by_ids                   ├── find_for_owner / find_all       │
//! │  ├── decrease_stock                ├── set_status                      │
//! │  └── increase_stock                └── compare_and_set_status          │
//! │       │                                  │                              │
//! │       └──────────────┬───────────────────┘                              │
//! │                      ▼                                                  │
//! │               SQLite Database                                          │
//! │                                                                         │
//! │  Both are passive: they enforce storage invariants (stock ≥ 0,         │
//! │  status ∈ {created, paid, cancelled}) but make no business decisions.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Catalog and stock ledger
//! - [`OrderRepository`] - Orders, line items and status

pub mod order;
pub mod product;

pub use order::OrderRepository;
pub use product::ProductRepository;
