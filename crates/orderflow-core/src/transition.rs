//! # Order Status State Machine
//!
//! Decides what a pay or cancel request does to an order, given its current
//! status. Pure: the caller performs the write.
//!
//! ```text
//!            pay                       cancel
//! created ─────────► paid      created ─────────► cancelled
//! paid    ─────────► paid      paid    ─────────► cancelled   (refund required)
//!         (no-op)              cancelled ───────► cancelled   (no-op)
//! cancelled ──pay──► ERROR (Conflict)
//! ```
//!
//! Nothing leaves `cancelled`, nothing re-enters `created`.

use crate::error::{CoreError, CoreResult};
use crate::types::{OrderAction, OrderStatus};

/// Outcome of applying an action to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write `to`, guarded on the status still being `from`.
    Apply { from: OrderStatus, to: OrderStatus },
    /// The order is already in the requested state. Return it as-is.
    Unchanged(OrderStatus),
}

impl Transition {
    /// True when cancelling an order that was already paid.
    ///
    /// The engine doesn't refund; it flags the event for whoever does.
    pub fn refund_required(&self) -> bool {
        matches!(
            self,
            Transition::Apply {
                from: OrderStatus::Paid,
                to: OrderStatus::Cancelled
            }
        )
    }

    /// True when nothing needs to be written.
    pub fn is_noop(&self) -> bool {
        matches!(self, Transition::Unchanged(_))
    }
}

/// Checks whether `from → to` is an edge of the state machine (self-loops
/// excluded).
pub const fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    matches!(
        (from, to),
        (OrderStatus::Created, OrderStatus::Paid)
            | (OrderStatus::Created, OrderStatus::Cancelled)
            | (OrderStatus::Paid, OrderStatus::Cancelled)
    )
}

/// Decides the transition for `action` on an order currently in `current`.
///
/// ## Returns
/// * `Ok(Transition::Apply)` - legal move, caller writes it
/// * `Ok(Transition::Unchanged)` - idempotent replay
/// * `Err(CoreError::InvalidOrderStatus)` - illegal move (pay a cancelled order)
pub fn decide(order_id: &str, current: OrderStatus, action: OrderAction) -> CoreResult<Transition> {
    let target = action.target();

    if current == target {
        return Ok(Transition::Unchanged(current));
    }

    if can_transition(current, target) {
        return Ok(Transition::Apply {
            from: current,
            to: target,
        });
    }

    Err(CoreError::InvalidOrderStatus {
        order_id: order_id.to_string(),
        current,
        action,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_pay_created() {
        let t = decide("o", OrderStatus::Created, OrderAction::Pay).unwrap();
        assert_eq!(
            t,
            Transition::Apply {
                from: OrderStatus::Created,
                to: OrderStatus::Paid
            }
        );
        assert!(!t.refund_required());
    }

    #[test]
    fn test_pay_paid_is_noop() {
        let t = decide("o", OrderStatus::Paid, OrderAction::Pay).unwrap();
        assert_eq!(t, Transition::Unchanged(OrderStatus::Paid));
        assert!(t.is_noop());
    }

    #[test]
    fn test_pay_cancelled_conflicts() {
        let err = decide("o-9", OrderStatus::Cancelled, OrderAction::Pay).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "Cannot pay a cancelled order: o-9");
    }

    #[test]
    fn test_cancel_created_and_paid() {
        let from_created = decide("o", OrderStatus::Created, OrderAction::Cancel).unwrap();
        assert!(!from_created.is_noop());
        assert!(!from_created.refund_required());

        let from_paid = decide("o", OrderStatus::Paid, OrderAction::Cancel).unwrap();
        assert!(from_paid.refund_required());
    }

    #[test]
    fn test_cancel_cancelled_is_noop() {
        let t = decide("o", OrderStatus::Cancelled, OrderAction::Cancel).unwrap();
        assert_eq!(t, Transition::Unchanged(OrderStatus::Cancelled));
    }

    #[test]
    fn test_no_edge_leaves_cancelled_or_enters_created() {
        let all = [OrderStatus::Created, OrderStatus::Paid, OrderStatus::Cancelled];
        for status in all {
            assert!(!can_transition(OrderStatus::Cancelled, status));
            assert!(!can_transition(status, OrderStatus::Created));
        }
        assert!(!can_transition(OrderStatus::Paid, OrderStatus::Paid));
    }
}
