//! # Reservation Saga
//!
//! Bookkeeping for multi-item stock reservation.
//!
//! Each line of a new order is reserved with its own atomic decrement. The
//! set of decrements is not one storage transaction, so the engine records
//! every committed reservation here and, if a later step fails, replays the
//! compensations (stock restores) in reverse order before surfacing the error.
//!
//! ```text
//! reserve P1 ✓ ──► record(P1, 2)
//! reserve P2 ✓ ──► record(P2, 1)
//! reserve P3 ✗
//!      │
//!      ▼
//! compensations(): restore P2 × 1, then P1 × 2
//! ```

use serde::Serialize;

/// A committed stock decrement that may need undoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub product_id: String,
    pub quantity: i64,
}

/// Ordered log of committed reservations for one order request.
#[derive(Debug, Default)]
pub struct ReservationSaga {
    committed: Vec<Reservation>,
}

impl ReservationSaga {
    pub fn new() -> Self {
        ReservationSaga::default()
    }

    /// Records a reservation that the ledger has committed.
    pub fn record(&mut self, product_id: impl Into<String>, quantity: i64) {
        self.committed.push(Reservation {
            product_id: product_id.into(),
            quantity,
        });
    }

    /// Number of committed reservations.
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Committed reservations, in commit order.
    pub fn committed(&self) -> &[Reservation] {
        &self.committed
    }

    /// Consumes the saga, yielding the compensating restores newest-first.
    pub fn compensations(self) -> impl Iterator<Item = Reservation> {
        self.committed.into_iter().rev()
    }

    /// Marks the saga as finished. Nothing is left to compensate.
    pub fn complete(self) -> usize {
        self.committed.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compensations_run_in_reverse() {
        let mut saga = ReservationSaga::new();
        saga.record("p1", 2);
        saga.record("p2", 1);
        saga.record("p3", 7);
        assert_eq!(saga.len(), 3);

        let order: Vec<String> = saga.compensations().map(|r| r.product_id).collect();
        assert_eq!(order, vec!["p3", "p2", "p1"]);
    }

    #[test]
    fn test_same_product_twice_compensates_both() {
        let mut saga = ReservationSaga::new();
        saga.record("p1", 2);
        saga.record("p1", 3);

        let total: i64 = saga.compensations().map(|r| r.quantity).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_empty_saga() {
        let saga = ReservationSaga::new();
        assert!(saga.is_empty());
        assert_eq!(saga.compensations().count(), 0);
    }

    #[test]
    fn test_complete_reports_count() {
        let mut saga = ReservationSaga::new();
        saga.record("p1", 1);
        assert_eq!(saga.committed()[0].quantity, 1);
        assert_eq!(saga.complete(), 1);
    }
}
