//! # Product Catalog
//!
//! Admin-facing product management. Authorization happens upstream; by the
//! time a call lands here the caller is known to be allowed.
//!
//! Price changes only affect orders placed afterwards: existing orders keep
//! the unit price they were created with.

use tracing::info;

use crate::error::ServiceResult;
use orderflow_core::validation::{validate_new_product, validate_product_update};
use orderflow_core::{CoreError, NewProduct, Product, ProductUpdate};
use orderflow_db::Database;

/// Catalog operations over the product ledger.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    db: Database,
}

impl ProductCatalog {
    pub fn new(db: Database) -> Self {
        ProductCatalog { db }
    }

    /// Validates and inserts a product.
    pub async fn create_product(&self, product: &NewProduct) -> ServiceResult<Product> {
        let product = validate_new_product(product)?;
        let created = self.db.products().insert(&product).await?;

        info!(
            product_id = %created.id,
            name = %created.name,
            price = created.price,
            stock = created.stock,
            "Product created"
        );
        Ok(created)
    }

    /// All products, newest first.
    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Applies a partial update; at least one field must be set.
    pub async fn update_product(&self, id: &str, update: &ProductUpdate) -> ServiceResult<Product> {
        let update = validate_product_update(update)?;

        let updated = self
            .db
            .products()
            .update(id, &update)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        info!(product_id = %id, price = updated.price, stock = updated.stock, "Product updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::ErrorKind;
    use orderflow_db::DbConfig;

    async fn catalog() -> ProductCatalog {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ProductCatalog::new(db)
    }

    #[tokio::test]
    async fn test_create_trims_and_validates() {
        let catalog = catalog().await;

        let product = catalog
            .create_product(&NewProduct {
                name: "  Monitor ".to_string(),
                price: 19999,
                stock: 4,
            })
            .await
            .unwrap();
        assert_eq!(product.name, "Monitor");

        let err = catalog
            .create_product(&NewProduct {
                name: "Broken".to_string(),
                price: -1,
                stock: 4,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(catalog.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_update() {
        let catalog = catalog().await;
        let product = catalog
            .create_product(&NewProduct {
                name: "Chair".to_string(),
                price: 8900,
                stock: 2,
            })
            .await
            .unwrap();

        let updated = catalog
            .update_product(
                &product.id,
                &ProductUpdate {
                    stock: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stock, 10);
        assert_eq!(catalog.get_product(&product.id).await.unwrap().stock, 10);

        let err = catalog
            .update_product(&product.id, &ProductUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = catalog.get_product("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
