//! # Product Type Repository
//!
//! The category lookup table. Products reference types by name, so deleting
//! a type never touches the catalog.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::validation::require_trimmed;
use tally_core::ProductType;

const MAX_TYPE_NAME_LEN: usize = 100;

#[derive(Debug, Clone)]
pub struct ProductTypeRepository {
    pool: SqlitePool,
}

impl ProductTypeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductTypeRepository { pool }
    }

    /// All types ordered by name.
    pub async fn list(&self) -> DbResult<Vec<ProductType>> {
        let types = sqlx::query_as::<_, ProductType>(
            "SELECT id, name FROM product_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    /// Inserts a type with a fresh id. The name is trimmed first.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - a type with that name exists
    pub async fn insert(&self, name: &str) -> DbResult<ProductType> {
        let name = require_trimmed("type name", name, MAX_TYPE_NAME_LEN)?;
        let product_type = ProductType {
            id: Uuid::new_v4().to_string(),
            name,
        };
        debug!(name = %product_type.name, "Inserting product type");

        sqlx::query("INSERT INTO product_types (id, name) VALUES (?1, ?2)")
            .bind(&product_type.id)
            .bind(&product_type.name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("type", &product_type.name),
                other => other,
            })?;

        info!(id = %product_type.id, name = %product_type.name, "Product type added");
        Ok(product_type)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM product_types WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product type", id));
        }

        info!(id = %id, "Product type deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use tally_core::Product;

    #[tokio::test]
    async fn test_types_are_sorted_and_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.product_types();

        repo.insert("  Tiles ").await.unwrap();
        repo.insert("Paint").await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Paint", "Tiles"]);

        assert!(matches!(
            repo.insert("Paint").await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert!(matches!(repo.insert("   ").await, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_leaves_product_type_string() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let paint = db.product_types().insert("Paint").await.unwrap();
        db.products()
            .insert(&Product {
                code: "PNT-001".to_string(),
                packaging: "1L".to_string(),
                name: "Primer".to_string(),
                product_type: Some("Paint".to_string()),
                quantity: 1,
                sourcing_price_minor: 1,
                selling_price_minor: 2,
                deleted: false,
                deleted_at: None,
            })
            .await
            .unwrap();

        db.product_types().delete(&paint.id).await.unwrap();

        assert!(db.product_types().list().await.unwrap().is_empty());
        let product = db.products().get("PNT-001", "1L").await.unwrap().unwrap();
        assert_eq!(product.product_type.as_deref(), Some("Paint"));

        assert!(matches!(
            db.product_types().delete(&paint.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
