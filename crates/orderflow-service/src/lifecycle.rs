//! # Order Lifecycle Engine
//!
//! Orchestrates the product ledger and the order store. This is the only
//! place with business rules; the repositories underneath are passive.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         create_order                                    │
//! │                                                                         │
//! │  1. validate items                                                     │
//! │  2. find_by_ids(unique ids) ── any missing? ──► NotFound (nothing done)│
//! │  3. for each line, in request order:                                   │
//! │       snapshot stock ≥ qty? ── no ──► InsufficientStock ─┐             │
//! │       price line (snapshot unit price)                   │             │
//! │       decrease_stock ── None ──► ReservationFailed ──────┤             │
//! │       saga.record(product, qty)                          │             │
//! │  4. orders.create(items, total) ── Err ──────────────────┤             │
//! │       │                                                  ▼             │
//! │       ▼                               compensate: increase_stock for   │
//! │     Order { status: created }         each reservation, newest first,  │
//! │                                       then surface the error           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transitions
//! Pay and cancel read the order, ask [`orderflow_core::transition::decide`]
//! what to do, and write with compare-and-set on the status they read. If the
//! guard misses (someone else moved the order first), the order is re-read
//! once: already in the target state means an idempotent no-op, anything
//! else is a Conflict. Mutations are never retried.
//!
//! Cancellation is guarded on "not cancelled yet" instead, since both live
//! statuses may be cancelled. It restores every line's stock and flips the
//! status in one transaction, and reports whether the order had been paid by
//! the time the write landed.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{ServiceError, ServiceResult};
use orderflow_core::draft::OrderDraft;
use orderflow_core::saga::ReservationSaga;
use orderflow_core::transition::{decide, Transition};
use orderflow_core::validation::validate_order_items;
use orderflow_core::{CoreError, Order, OrderAction, OrderItemRequest, OrderScope, Principal, Product};
use orderflow_db::repository::order::cancel_in;
use orderflow_db::repository::product::increase_stock_with;
use orderflow_db::{Database, DbError};

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    /// The order, now cancelled.
    pub order: Order,

    /// True when the order had been paid. Refunds happen elsewhere; this
    /// only tells the caller one is owed.
    pub refund_required: bool,
}

/// The order lifecycle engine.
///
/// Holds no state of its own besides the database handle; clone freely and
/// share across tasks.
///
/// ## Usage
/// ```rust,ignore
/// let engine = OrderLifecycle::new(db.clone());
///
/// let order = engine
///     .create_order(&Principal::customer(user_id), &[OrderItemRequest::new(product_id, 2)])
///     .await?;
/// let order = engine.pay_order(&order.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderLifecycle {
    db: Database,
}

impl OrderLifecycle {
    pub fn new(db: Database) -> Self {
        OrderLifecycle { db }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Prices and reserves every line, then stores the order.
    ///
    /// Either the order exists and all of its stock is reserved, or the
    /// error is returned with every reservation made by this call undone.
    ///
    /// ## Errors
    /// - Validation: empty items, bad quantity or id, insufficient stock,
    ///   reservation lost to a concurrent order
    /// - NotFound: one or more products don't exist (ids listed)
    pub async fn create_order(
        &self,
        principal: &Principal,
        items: &[OrderItemRequest],
    ) -> ServiceResult<Order> {
        validate_order_items(items)?;

        let ids = unique_product_ids(items);
        let products = self.db.products().find_by_ids(&ids).await?;
        let by_id: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !by_id.contains_key(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::ProductsNotFound { ids: missing }.into());
        }

        let mut saga = ReservationSaga::new();

        match self.reserve_and_store(principal, items, &by_id, &mut saga).await {
            Ok(order) => {
                let reserved = saga.complete();
                info!(
                    order_id = %order.id,
                    user_id = %order.user_id,
                    total = order.total,
                    lines = reserved,
                    "Order created"
                );
                Ok(order)
            }
            Err(err) => {
                self.compensate(saga, &err).await;
                Err(err)
            }
        }
    }

    async fn reserve_and_store(
        &self,
        principal: &Principal,
        items: &[OrderItemRequest],
        by_id: &HashMap<&str, &Product>,
        saga: &mut ReservationSaga,
    ) -> ServiceResult<Order> {
        let ledger = self.db.products();
        let mut draft = OrderDraft::new();

        for item in items {
            let product = by_id
                .get(item.product_id.as_str())
                .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

            // Snapshot check for the message; the ledger re-checks atomically
            if !product.has_stock_for(item.quantity) {
                return Err(CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock,
                    requested: item.quantity,
                }
                .into());
            }

            draft.add_line(product, item.quantity)?;

            ledger
                .decrease_stock(&product.id, item.quantity)
                .await?
                .ok_or_else(|| CoreError::ReservationFailed {
                    product: product.name.clone(),
                })?;
            saga.record(product.id.clone(), item.quantity);
        }

        let (lines, total) = draft.into_parts();
        let order = self
            .db
            .orders()
            .create(&principal.user_id, &lines, total)
            .await?;

        Ok(order)
    }

    /// Undoes committed reservations, newest first.
    ///
    /// A restore that fails is logged and skipped; the original error is
    /// what the caller sees.
    async fn compensate(&self, saga: ReservationSaga, cause: &ServiceError) {
        if saga.is_empty() {
            return;
        }

        warn!(
            reservations = saga.len(),
            error = %cause,
            "Order creation failed, restoring reserved stock"
        );

        let ledger = self.db.products();
        for reservation in saga.compensations() {
            if let Err(err) = ledger
                .increase_stock(&reservation.product_id, reservation.quantity)
                .await
            {
                error!(
                    product_id = %reservation.product_id,
                    quantity = reservation.quantity,
                    error = %err,
                    "Failed to restore reserved stock"
                );
            }
        }
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Orders visible to the principal, newest first.
    ///
    /// Admins see every order; customers see their own.
    pub async fn get_orders(&self, principal: &Principal) -> ServiceResult<Vec<Order>> {
        let orders = match principal.order_scope() {
            OrderScope::All => self.db.orders().find_all().await?,
            OrderScope::Owner(user_id) => self.db.orders().find_for_owner(&user_id).await?,
        };

        Ok(orders)
    }

    /// Loads one order or fails with NotFound.
    pub async fn get_order(&self, order_id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// created → paid. Paying a paid order returns it unchanged.
    ///
    /// ## Errors
    /// - NotFound: no such order
    /// - Conflict: the order is cancelled, or was moved concurrently
    pub async fn pay_order(&self, order_id: &str) -> ServiceResult<Order> {
        let order = self.get_order(order_id).await?;

        match decide(order_id, order.status, OrderAction::Pay)? {
            Transition::Unchanged(_) => {
                debug!(order_id = %order_id, "Order already paid");
                Ok(order)
            }
            Transition::Apply { from, to } => {
                match self
                    .db
                    .orders()
                    .compare_and_set_status(order_id, from, to)
                    .await?
                {
                    Some(paid) => {
                        info!(order_id = %order_id, total = paid.total, "Order paid");
                        Ok(paid)
                    }
                    None => self.settle_lost_race(order_id, OrderAction::Pay).await,
                }
            }
        }
    }

    /// created/paid → cancelled, restoring stock for every line.
    /// Cancelling a cancelled order returns it unchanged with no stock change.
    ///
    /// The guard is "not cancelled yet" rather than the status read up
    /// front, so a pay that lands in between still cancels, and is then
    /// reported as a paid cancellation.
    ///
    /// ## Errors
    /// - NotFound: no such order
    pub async fn cancel_order(&self, order_id: &str) -> ServiceResult<Cancellation> {
        let order = self.get_order(order_id).await?;

        if let Transition::Unchanged(_) = decide(order_id, order.status, OrderAction::Cancel)? {
            debug!(order_id = %order_id, "Order already cancelled");
            return Ok(Cancellation {
                order,
                refund_required: false,
            });
        }

        let mut tx = self.db.begin().await?;

        let Some((prior, cancelled)) = cancel_in(&mut *tx, order_id).await? else {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            let order = self
                .settle_lost_race(order_id, OrderAction::Cancel)
                .await?;
            return Ok(Cancellation {
                order,
                refund_required: false,
            });
        };

        for item in &cancelled.items {
            increase_stock_with(&mut *tx, &item.product_id, item.quantity).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let refund_required = decide(order_id, prior, OrderAction::Cancel)?.refund_required();
        if refund_required {
            warn!(
                order_id = %order_id,
                user_id = %cancelled.user_id,
                total = cancelled.total,
                "Cancelled a paid order, refund required"
            );
        } else {
            info!(
                order_id = %order_id,
                lines = cancelled.items.len(),
                "Order cancelled, stock restored"
            );
        }

        Ok(Cancellation {
            order: cancelled,
            refund_required,
        })
    }

    /// Re-reads an order whose guarded write missed and reports where it
    /// ended up: the target state is a no-op, an illegal state is the usual
    /// Conflict, anything else is a concurrent modification.
    async fn settle_lost_race(&self, order_id: &str, action: OrderAction) -> ServiceResult<Order> {
        let current = self.get_order(order_id).await?;

        match decide(order_id, current.status, action)? {
            Transition::Unchanged(_) => {
                debug!(order_id = %order_id, action = %action, "Concurrent request already applied");
                Ok(current)
            }
            Transition::Apply { .. } => {
                warn!(
                    order_id = %order_id,
                    action = %action,
                    status = %current.status,
                    "Order modified concurrently"
                );
                Err(CoreError::ConcurrentModification {
                    order_id: order_id.to_string(),
                    current: current.status,
                }
                .into())
            }
        }
    }
}

/// Distinct product ids in first-seen order.
fn unique_product_ids(items: &[OrderItemRequest]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.product_id.as_str()))
        .map(|item| item.product_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_product_ids_keeps_first_seen_order() {
        let items = vec![
            OrderItemRequest::new("b", 1),
            OrderItemRequest::new("a", 2),
            OrderItemRequest::new("b", 3),
        ];
        assert_eq!(unique_product_ids(&items), vec!["b", "a"]);
    }

    #[test]
    fn test_cancellation_json() {
        let order = Order {
            id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            items: vec![],
            total: 0,
            status: orderflow_core::OrderStatus::Cancelled,
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(Cancellation {
            order,
            refund_required: true,
        })
        .unwrap();
        assert_eq!(json["refundRequired"], true);
        assert_eq!(json["order"]["status"], "cancelled");
    }
}
