//! # Domain Types
//!
//! Core domain types used throughout orderflow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id     │       │
//! │  │  name           │   │  user_id        │   │  quantity       │       │
//! │  │  price          │   │  items ─────────┼──►│  unit_price     │       │
//! │  │  stock          │   │  total, status  │   │  (snapshot)     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderStatus   │   │      Role       │   │   Principal     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Created        │   │  Admin          │   │  user_id        │       │
//! │  │  Paid           │   │  Customer       │   │  role           │       │
//! │  │  Cancelled      │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All JSON representations use camelCase field names
//! (`userId`, `unitPrice`, `createdAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its current stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, used in stock error messages.
    pub name: String,

    /// Current unit price in minor currency units.
    pub price: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated (price, name or stock).
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price)
    }

    /// Checks the snapshot stock against a requested quantity.
    ///
    /// Only a hint: the authoritative check is the ledger's conditional
    /// decrement.
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Input for creating a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i64,
}

/// Partial update for a catalog product. At least one field must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// See [`crate::transition`] for the legal moves between these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Stock reserved, awaiting payment.
    Created,
    /// Payment recorded.
    Paid,
    /// Cancelled; stock has been restored. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Lowercase name, identical to the stored and serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Created
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller-requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Pay,
    Cancel,
}

impl OrderAction {
    /// The status this action moves an order into.
    pub const fn target(&self) -> OrderStatus {
        match self {
            OrderAction::Pay => OrderStatus::Paid,
            OrderAction::Cancel => OrderStatus::Cancelled,
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Pay => f.write_str("pay"),
            OrderAction::Cancel => f.write_str("cancel"),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// One requested line of a new order, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl OrderItemRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        OrderItemRequest {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A priced line item of an order.
/// Uses snapshot pattern to freeze the unit price at time of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    /// Quantity ordered (≥ 1).
    pub quantity: i64,
    /// Unit price in minor units at time of order (frozen).
    pub unit_price: i64,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price)
    }

    /// Returns quantity × unit price, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().line_total(self.quantity)
    }
}

/// An order: a price snapshot of reserved stock plus its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    /// Line items in request order.
    pub items: Vec<OrderItem>,
    /// Σ quantity × unit_price, fixed at creation.
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total)
    }
}

// =============================================================================
// Principals and Roles
// =============================================================================

/// Role of an authenticated caller. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    /// Which orders a caller with this role may list.
    ///
    /// ```rust
    /// use orderflow_core::{OrderScope, Role};
    ///
    /// assert_eq!(Role::Admin.order_scope("u-1"), OrderScope::All);
    /// assert_eq!(Role::Customer.order_scope("u-1"), OrderScope::Owner("u-1".into()));
    /// ```
    pub fn order_scope(&self, user_id: &str) -> OrderScope {
        match self {
            Role::Admin => OrderScope::All,
            Role::Customer => OrderScope::Owner(user_id.to_string()),
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Customer => f.write_str("customer"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: format!("unknown role '{}', expected admin or customer", other),
            }),
        }
    }
}

/// Visibility of orders for a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order in the store.
    All,
    /// Only orders owned by this user id.
    Owner(String),
}

/// The authenticated caller, as supplied by the upstream auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Principal {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn customer(user_id: impl Into<String>) -> Self {
        Principal::new(user_id, Role::Customer)
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Principal::new(user_id, Role::Admin)
    }

    /// Scope of orders this principal may see.
    pub fn order_scope(&self) -> OrderScope {
        self.role.order_scope(&self.user_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }

    #[test]
    fn test_order_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        assert_eq!(OrderStatus::Paid.to_string(), "paid");
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(OrderAction::Pay.target(), OrderStatus::Paid);
        assert_eq!(OrderAction::Cancel.target(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Customer ".parse::<Role>().unwrap(), Role::Customer);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_principal_scope() {
        assert_eq!(Principal::admin("a-1").order_scope(), OrderScope::All);
        assert_eq!(
            Principal::customer("c-1").order_scope(),
            OrderScope::Owner("c-1".to_string())
        );
    }

    #[test]
    fn test_order_json_shape() {
        let order = Order {
            id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            items: vec![OrderItem {
                product_id: "p-1".to_string(),
                quantity: 2,
                unit_price: 99999,
            }],
            total: 199998,
            status: OrderStatus::Created,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["userId"], "u-1");
        assert_eq!(value["items"][0]["productId"], "p-1");
        assert_eq!(value["items"][0]["unitPrice"], 99999);
        assert_eq!(value["total"], 199998);
        assert_eq!(value["status"], "created");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_product_update_is_empty() {
        assert!(ProductUpdate::default().is_empty());
        let update = ProductUpdate {
            price: Some(10),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
