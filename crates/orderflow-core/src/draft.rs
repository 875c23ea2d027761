//! # Order Draft
//!
//! Accumulates priced line items while an order is being reserved.
//! Unit prices are copied from the product snapshot at the moment the line
//! is added, which is what makes an order a price snapshot.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderItem, Product};

/// Line items and running total for an order under construction.
#[derive(Debug, Default)]
pub struct OrderDraft {
    items: Vec<OrderItem>,
    total: Money,
}

impl OrderDraft {
    pub fn new() -> Self {
        OrderDraft::default()
    }

    /// Adds a line priced at the product's current price.
    ///
    /// ## Errors
    /// `CoreError::TotalOverflow` if the line total or running total
    /// doesn't fit.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        let line_total = product
            .price()
            .line_total(quantity)
            .ok_or(CoreError::TotalOverflow)?;
        self.total = self
            .total
            .checked_add(line_total)
            .ok_or(CoreError::TotalOverflow)?;

        self.items.push(OrderItem {
            product_id: product.id.clone(),
            quantity,
            unit_price: product.price,
        });
        Ok(())
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn into_parts(self) -> (Vec<OrderItem>, Money) {
        (self.items, self.total)
    }
}

/// Recomputes Σ quantity × unit_price for a set of stored items.
pub fn order_total(items: &[OrderItem]) -> CoreResult<Money> {
    items.iter().try_fold(Money::zero(), |acc, item| {
        item.line_total()
            .and_then(|line| acc.checked_add(line))
            .ok_or(CoreError::TotalOverflow)
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price,
            stock: 100,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_total_matches_reference_order() {
        let mut draft = OrderDraft::new();
        draft.add_line(&product("p1", 99999), 2).unwrap();
        draft.add_line(&product("p2", 2999), 3).unwrap();

        assert_eq!(draft.total().cents(), 208997);
        let (items, total) = draft.into_parts();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit_price, 99999);
        assert_eq!(order_total(&items).unwrap(), total);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut draft = OrderDraft::new();
        let err = draft.add_line(&product("p1", i64::MAX), 2).unwrap_err();
        assert!(matches!(err, CoreError::TotalOverflow));
        assert!(draft.items().is_empty());
    }

    #[test]
    fn test_free_items_total_zero() {
        let mut draft = OrderDraft::new();
        draft.add_line(&product("p1", 0), 5).unwrap();
        assert!(draft.total().is_zero());
    }
}
