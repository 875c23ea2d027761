//! # Order Repository (Order Store)
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Storage                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → orders row + order_items rows (one transaction)     │
//! │         status = 'created', unit prices frozen                         │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── find_by_id / find_for_owner / find_all                         │
//! │         one LEFT JOIN, rows grouped back into orders                   │
//! │                                                                         │
//! │  3. TRANSITION                                                         │
//! │     ├── set_status()             unconditional overwrite               │
//! │     ├── compare_and_set_status() WHERE status = expected               │
//! │     └── cancel_in()              WHERE status != 'cancelled'           │
//! │                                                                         │
//! │  Items, total and created_at never change after step 1.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store doesn't judge whether a transition is legal; that is the
//! lifecycle engine's job (`orderflow_core::transition`).

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use orderflow_core::{Money, Order, OrderItem, OrderStatus};

/// Joined select; callers append a WHERE clause and [`ORDER_ROWS_ORDERING`].
const ORDER_ROWS_SELECT: &str = r#"
    SELECT
        o.id,
        o.user_id,
        o.total,
        o.status,
        o.created_at,
        i.product_id,
        i.quantity,
        i.unit_price
    FROM orders o
    LEFT JOIN order_items i ON i.order_id = o.id
"#;

/// Newest first; rows of one order stay adjacent and in line order.
const ORDER_ROWS_ORDERING: &str = "ORDER BY o.created_at DESC, o.rowid DESC, i.position";

/// One row of the orders ⟕ order_items join.
#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: String,
    user_id: String,
    total: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    product_id: Option<String>,
    quantity: Option<i64>,
    unit_price: Option<i64>,
}

/// Folds adjacent join rows back into orders, keeping row order.
fn group_rows(rows: Vec<OrderLineRow>) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::new();

    for row in rows {
        let OrderLineRow {
            id,
            user_id,
            total,
            status,
            created_at,
            product_id,
            quantity,
            unit_price,
        } = row;

        let item = match (product_id, quantity, unit_price) {
            (Some(product_id), Some(quantity), Some(unit_price)) => Some(OrderItem {
                product_id,
                quantity,
                unit_price,
            }),
            _ => None,
        };

        match orders.last_mut() {
            Some(last) if last.id == id => last.items.extend(item),
            _ => orders.push(Order {
                id,
                user_id,
                items: item.into_iter().collect(),
                total,
                status,
                created_at,
            }),
        }
    }

    orders
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists a new order with status `created`.
    ///
    /// ## Arguments
    /// * `user_id` - Owner of the order
    /// * `items` - Priced lines, stored in the given order
    /// * `total` - Σ quantity × unit_price, computed by the caller
    ///
    /// The order row and all item rows are written in one transaction.
    pub async fn create(&self, user_id: &str, items: &[OrderItem], total: Money) -> DbResult<Order> {
        let id = generate_order_id();
        let now = Utc::now();

        debug!(id = %id, user_id = %user_id, items = items.len(), "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(total.cents())
        .bind(OrderStatus::Created)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, quantity, unit_price)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id,
            user_id: user_id.to_string(),
            items: items.to_vec(),
            total: total.cents(),
            status: OrderStatus::Created,
            created_at: now,
        })
    }

    /// Gets an order with its items.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Order found
    /// * `Ok(None)` - Order not found
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        find_by_id_with(&self.pool, id).await
    }

    /// Orders owned by `user_id`, newest first.
    pub async fn find_for_owner(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "{ORDER_ROWS_SELECT} WHERE o.user_id = ?1 {ORDER_ROWS_ORDERING}"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let orders = group_rows(rows);
        debug!(user_id = %user_id, count = orders.len(), "Listed orders for owner");
        Ok(orders)
    }

    /// Every order, newest first.
    pub async fn find_all(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "{ORDER_ROWS_SELECT} {ORDER_ROWS_ORDERING}"
        ))
        .fetch_all(&self.pool)
        .await?;

        let orders = group_rows(rows);
        debug!(count = orders.len(), "Listed all orders");
        Ok(orders)
    }

    /// Overwrites the status, whatever it currently is.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Updated order
    /// * `Ok(None)` - Order not found
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> DbResult<Option<Order>> {
        debug!(id = %id, status = %status, "Setting order status");

        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Moves the order to `new` only if it is still in `expected`.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Status written
    /// * `Ok(None)` - Order missing, or its status is no longer `expected`
    pub async fn compare_and_set_status(
        &self,
        id: &str,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        compare_and_set_status_in(&mut conn, id, expected, new).await
    }

    /// Counts total orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-generic operations
// =============================================================================

/// Loads one order with its items through any executor.
pub async fn find_by_id_with<'e, E>(executor: E, id: &str) -> DbResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
        "{ORDER_ROWS_SELECT} WHERE o.id = ?1 {ORDER_ROWS_ORDERING}"
    ))
    .bind(id)
    .fetch_all(executor)
    .await?;

    Ok(group_rows(rows).into_iter().next())
}

/// Guarded status write on a caller-owned connection or transaction.
///
/// The write is the first statement so that, inside a transaction, SQLite
/// takes the write lock up front instead of upgrading a read snapshot.
pub async fn compare_and_set_status_in(
    conn: &mut SqliteConnection,
    id: &str,
    expected: OrderStatus,
    new: OrderStatus,
) -> DbResult<Option<Order>> {
    debug!(id = %id, from = %expected, to = %new, "Compare-and-set order status");

    let result = sqlx::query(
        "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
    )
    .bind(id)
    .bind(expected)
    .bind(new)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find_by_id_with(&mut *conn, id).await
}

/// Cancels an order from whatever live status it is in, on a caller-owned
/// connection or transaction.
///
/// The first statement touches the row only if it isn't cancelled yet and
/// reports its status, which takes the write lock before anything is read.
/// A pay that committed before this call is therefore seen here as `paid`.
///
/// ## Returns
/// * `Ok(Some((prior, order)))` - Order cancelled; `prior` is the status it left
/// * `Ok(None)` - Order missing or already cancelled
pub async fn cancel_in(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<(OrderStatus, Order)>> {
    debug!(id = %id, "Cancelling order");

    let prior: Option<OrderStatus> = sqlx::query_scalar(
        "UPDATE orders SET updated_at = ?2 WHERE id = ?1 AND status != ?3 RETURNING status",
    )
    .bind(id)
    .bind(Utc::now())
    .bind(OrderStatus::Cancelled)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(prior) = prior else {
        return Ok(None);
    };

    sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
        .bind(id)
        .bind(OrderStatus::Cancelled)
        .execute(&mut *conn)
        .await?;

    let order = find_by_id_with(&mut *conn, id).await?;
    Ok(order.map(|order| (prior, order)))
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use orderflow_core::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, price: i64) -> String {
        db.products()
            .insert(&NewProduct {
                name: "Widget".to_string(),
                price,
                stock: 100,
            })
            .await
            .unwrap()
            .id
    }

    fn line(product_id: &str, quantity: i64, unit_price: i64) -> OrderItem {
        OrderItem {
            product_id: product_id.to_string(),
            quantity,
            unit_price,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = test_db().await;
        let p1 = seed_product(&db, 500).await;
        let p2 = seed_product(&db, 250).await;
        let repo = db.orders();

        let items = vec![line(&p1, 2, 500), line(&p2, 1, 250)];
        let order = repo
            .create("user-1", &items, Money::from_cents(1250))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Created);

        let fetched = repo.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(fetched.items, items);
        assert_eq!(fetched.total, 1250);
        assert_eq!(fetched.user_id, "user-1");
        assert_eq!(fetched.created_at, order.created_at);

        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = test_db().await;
        let err = db
            .orders()
            .create("user-1", &[line("ghost", 1, 100)], Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::DbError::ForeignKeyViolation { .. }));

        // Nothing half-written
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_listing_scopes_and_ordering() {
        let db = test_db().await;
        let p = seed_product(&db, 100).await;
        let repo = db.orders();

        let a = repo.create("alice", &[line(&p, 1, 100)], Money::from_cents(100)).await.unwrap();
        let b = repo.create("bob", &[line(&p, 2, 100)], Money::from_cents(200)).await.unwrap();
        let c = repo.create("alice", &[line(&p, 3, 100)], Money::from_cents(300)).await.unwrap();

        let alice: Vec<String> = repo
            .find_for_owner("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(alice, vec![c.id.clone(), a.id.clone()]);

        let all = repo.find_all().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![c.id.as_str(), b.id.as_str(), a.id.as_str()]);
        assert!(all.iter().all(|o| o.items.len() == 1));
    }

    #[tokio::test]
    async fn test_set_status_is_unconditional() {
        let db = test_db().await;
        let p = seed_product(&db, 100).await;
        let repo = db.orders();
        let order = repo.create("u", &[line(&p, 1, 100)], Money::from_cents(100)).await.unwrap();

        let cancelled = repo
            .set_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // The store doesn't enforce the state machine
        let paid = repo.set_status(&order.id, OrderStatus::Paid).await.unwrap().unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        assert!(repo.set_status("missing", OrderStatus::Paid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_compare_and_set_status() {
        let db = test_db().await;
        let p = seed_product(&db, 100).await;
        let repo = db.orders();
        let order = repo.create("u", &[line(&p, 1, 100)], Money::from_cents(100)).await.unwrap();

        let paid = repo
            .compare_and_set_status(&order.id, OrderStatus::Created, OrderStatus::Paid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.items.len(), 1);

        // Stale expectation loses
        let lost = repo
            .compare_and_set_status(&order.id, OrderStatus::Created, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(lost.is_none());

        let current = repo.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(current.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_cancel_in_reports_prior_status() {
        let db = test_db().await;
        let p = seed_product(&db, 100).await;
        let repo = db.orders();
        let fresh = repo.create("u", &[line(&p, 1, 100)], Money::from_cents(100)).await.unwrap();
        let paid = repo.create("u", &[line(&p, 2, 100)], Money::from_cents(200)).await.unwrap();
        repo.set_status(&paid.id, OrderStatus::Paid).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        let (prior, order) = cancel_in(&mut *tx, &fresh.id).await.unwrap().unwrap();
        assert_eq!(prior, OrderStatus::Created);
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.items.len(), 1);

        let (prior, order) = cancel_in(&mut *tx, &paid.id).await.unwrap().unwrap();
        assert_eq!(prior, OrderStatus::Paid);
        assert_eq!(order.status, OrderStatus::Cancelled);

        // Second cancel and unknown ids write nothing
        assert!(cancel_in(&mut *tx, &paid.id).await.unwrap().is_none());
        assert!(cancel_in(&mut *tx, "missing").await.unwrap().is_none());
        tx.commit().await.unwrap();

        let current = repo.find_by_id(&fresh.id).await.unwrap().unwrap();
        assert_eq!(current.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_group_rows_keeps_empty_orders() {
        let now = Utc::now();
        let row = |id: &str, product: Option<&str>| OrderLineRow {
            id: id.to_string(),
            user_id: "u".to_string(),
            total: 0,
            status: OrderStatus::Created,
            created_at: now,
            product_id: product.map(str::to_string),
            quantity: product.map(|_| 1),
            unit_price: product.map(|_| 0),
        };

        let orders = group_rows(vec![
            row("o1", Some("p1")),
            row("o1", Some("p2")),
            row("o2", None),
        ]);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].items.len(), 2);
        assert!(orders[1].items.is_empty());
    }
}
