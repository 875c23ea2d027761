//! # Validation Module
//!
//! Input validation utilities for orderflow.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport adapter (upstream)                                 │
//! │  ├── Request shape, JSON types                                         │
//! │  └── Authentication / role checks                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: orderflow-service                                            │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity >= 1)                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orderflow_core::validation::{validate_quantity, validate_uuid};
//!
//! validate_uuid("550e8400-e29b-41d4-a716-446655440000").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{NewProduct, OrderItemRequest, ProductUpdate};
use crate::MAX_PRODUCT_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use orderflow_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Keyboard ").unwrap(), "Keyboard");
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// There is no upper bound; stock availability limits what can be reserved
/// and line totals use checked arithmetic.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use orderflow_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock count. Zero is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use orderflow_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    validate_uuid_field("id", id)
}

fn validate_uuid_field(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates the item list of a new order.
///
/// ## Rules
/// - At least one item
/// - Every product id is a UUID
/// - Every quantity passes [`validate_quantity`]
///
/// Duplicate product ids are allowed; each line is reserved separately.
pub fn validate_order_items(items: &[OrderItemRequest]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    for item in items {
        validate_uuid_field("productId", &item.product_id)?;
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

/// Validates a new product and returns it with its name trimmed.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<NewProduct> {
    let name = validate_product_name(&product.name)?;
    validate_price_cents(product.price)?;
    validate_stock(product.stock)?;

    Ok(NewProduct {
        name,
        price: product.price,
        stock: product.stock,
    })
}

/// Validates a partial product update and returns it with its name trimmed.
///
/// ## Rules
/// - At least one field must be provided
/// - Provided fields follow the same rules as [`validate_new_product`]
pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<ProductUpdate> {
    if update.is_empty() {
        return Err(ValidationError::Required {
            field: "at least one of name, price, stock".to_string(),
        });
    }

    let name = update
        .name
        .as_deref()
        .map(validate_product_name)
        .transpose()?;

    if let Some(price) = update.price {
        validate_price_cents(price)?;
    }
    if let Some(stock) = update.stock {
        validate_stock(stock)?;
    }

    Ok(ProductUpdate {
        name,
        price: update.price,
        stock: update.stock,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name("Laptop").unwrap(), "Laptop");
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_001).is_ok());
        assert!(validate_quantity(i64::MAX).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_stock_and_price() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid(ID).is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }

    #[test]
    fn test_validate_order_items() {
        assert!(validate_order_items(&[OrderItemRequest::new(ID, 2)]).is_ok());

        let err = validate_order_items(&[]).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));

        let err = validate_order_items(&[OrderItemRequest::new("nope", 1)]).unwrap_err();
        assert_eq!(err.to_string(), "productId has invalid format: must be a valid UUID");

        assert!(validate_order_items(&[OrderItemRequest::new(ID, 0)]).is_err());

        // No cap on the number of lines
        let many: Vec<_> = (0..101).map(|_| OrderItemRequest::new(ID, 1)).collect();
        assert!(validate_order_items(&many).is_ok());
    }

    #[test]
    fn test_validate_new_product_trims_name() {
        let product = NewProduct {
            name: "  Mouse  ".to_string(),
            price: 2999,
            stock: 10,
        };
        assert_eq!(validate_new_product(&product).unwrap().name, "Mouse");

        let bad = NewProduct {
            name: "Mouse".to_string(),
            price: 2999,
            stock: -3,
        };
        assert!(validate_new_product(&bad).is_err());
    }

    #[test]
    fn test_validate_product_update() {
        assert!(validate_product_update(&ProductUpdate::default()).is_err());

        let update = ProductUpdate {
            name: Some(" Desk ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_product_update(&update).unwrap().name.as_deref(),
            Some("Desk")
        );

        let update = ProductUpdate {
            price: Some(-5),
            ..Default::default()
        };
        assert!(validate_product_update(&update).is_err());
    }
}
