//! # Product Repository (Stock Ledger)
//!
//! Database operations for products and their stock counts.
//!
//! ## Key Operations
//! - Catalog CRUD (insert, list, get, partial update)
//! - Batch lookup for order pricing
//! - Atomic stock reservation and restoration
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 How Stock Reservation Stays Above Zero                  │
//! │                                                                         │
//! │  ❌ WRONG: Read, check, then write (race window)                       │
//! │     SELECT stock FROM products WHERE id = ?      → 5                   │
//! │     (another order takes 4 here)                                       │
//! │     UPDATE products SET stock = 5 - 3 WHERE id = ?                     │
//! │                                                                         │
//! │  ✅ CORRECT: One statement checks and mutates                          │
//! │     UPDATE products SET stock = stock - 3                              │
//! │     WHERE id = ? AND stock >= 3                                        │
//! │     RETURNING ...                                                      │
//! │                                                                         │
//! │  Order A: wants 3 of 5 → row returned, stock 2                         │
//! │  Order B: wants 3 of 2 → no row returned → None                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock mutations come in two flavours: methods on the repository that
//! run against the pool, and free `*_with` functions that accept any SQLite
//! executor so the caller can run them inside its own transaction.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use orderflow_core::{NewProduct, Product, ProductUpdate};

/// Column list shared by every product query.
const PRODUCT_COLUMNS: &str = "id, name, price, stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Reserve 2 units; None means not enough stock
/// let updated = repo.decrease_stock(&product_id, 2).await?;
///
/// // Batch fetch for pricing
/// let products = repo.find_by_ids(&ids).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product with a generated id.
    ///
    /// The input is expected to be validated already
    /// (see `orderflow_core::validation::validate_new_product`).
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        let id = generate_product_id();
        let now = Utc::now();

        debug!(id = %id, name = %product.name, "Inserting product");

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (id, name, price, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Fetches every product whose id is in `ids`.
    ///
    /// Unknown ids are simply absent from the result; the caller compares
    /// the two sets to report which are missing. Result order is unspecified.
    pub async fn find_by_ids(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(requested = ids.len(), found = products.len(), "Batch-fetched products");
        Ok(products)
    }

    /// Applies a partial update. Fields left as `None` keep their value.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Updated product
    /// * `Ok(None)` - Product not found
    pub async fn update(&self, id: &str, update: &ProductUpdate) -> DbResult<Option<Product>> {
        debug!(id = %id, "Updating product");

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                price = COALESCE(?3, price),
                stock = COALESCE(?4, stock),
                updated_at = ?5
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.price)
        .bind(update.stock)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Reserves `quantity` units if at least that many are in stock.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Stock decremented, updated record
    /// * `Ok(None)` - Not enough stock, or no such product
    pub async fn decrease_stock(&self, id: &str, quantity: i64) -> DbResult<Option<Product>> {
        decrease_stock_with(&self.pool, id, quantity).await
    }

    /// Puts `quantity` units back. Used to compensate reservations.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated record
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn increase_stock(&self, id: &str, quantity: i64) -> DbResult<Product> {
        increase_stock_with(&self.pool, id, quantity).await
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-generic stock mutations
// =============================================================================

/// Atomic conditional decrement against any executor (pool, connection or
/// transaction).
pub async fn decrease_stock_with<'e, E>(
    executor: E,
    id: &str,
    quantity: i64,
) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, quantity = quantity, "Decreasing stock");

    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Unconditional increment against any executor.
pub async fn increase_stock_with<'e, E>(executor: E, id: &str, quantity: i64) -> DbResult<Product>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, quantity = quantity, "Increasing stock");

    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await?;

    product.ok_or_else(|| DbError::not_found("Product", id))
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
