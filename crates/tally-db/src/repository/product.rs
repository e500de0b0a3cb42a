//! # Product Repository
//!
//! Catalog operations keyed by `(code, packaging)`.
//!
//! ## Soft Delete Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   insert ──► ACTIVE ──soft_delete──► DELETED ──hard_delete──► (gone)   │
//! │                 ▲                       │        only without sales     │
//! │                 └────────restore────────┘                               │
//! │                                                                         │
//! │   ACTIVE rows: list / search / update / add_stock / record_sale        │
//! │   DELETED rows: list_deleted (newest first)                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On a schema without the soft-delete capability every row is active,
//! `list_deleted` is empty, and delete/restore report a schema mismatch.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::SchemaCapabilities;
use tally_core::validation::validate_quantity;
use tally_core::{Product, ProductKey};

const COLUMNS: &str = r#"code, packaging, name, "type", quantity,
    sourcing_price_minor, selling_price_minor, deleted, deleted_at"#;

const LEGACY_COLUMNS: &str = r#"code, packaging, name, "type", quantity,
    sourcing_price_minor, selling_price_minor, 0 AS deleted, NULL AS deleted_at"#;

/// Product column list for the schema at hand.
pub(crate) fn columns(caps: SchemaCapabilities) -> &'static str {
    if caps.soft_delete {
        COLUMNS
    } else {
        LEGACY_COLUMNS
    }
}

/// `AND deleted = 0` when the column exists.
pub(crate) fn active_filter(caps: SchemaCapabilities) -> &'static str {
    if caps.soft_delete {
        " AND deleted = 0"
    } else {
        ""
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    caps: SchemaCapabilities,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, caps: SchemaCapabilities) -> Self {
        ProductRepository { pool, caps }
    }

    fn schema_mismatch(&self, operation: &str) -> DbError {
        DbError::schema_mismatch(format!(
            "{} needs schema version {} (database is at {})",
            operation,
            crate::migrations::SOFT_DELETE_VERSION,
            self.caps.version
        ))
    }

    /// Active products ordered by code, then packaging.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE 1 = 1{} ORDER BY code, packaging",
            columns(self.caps),
            active_filter(self.caps)
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Soft-deleted products, most recently deleted first.
    pub async fn list_deleted(&self) -> DbResult<Vec<Product>> {
        if !self.caps.soft_delete {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM products WHERE deleted = 1 ORDER BY deleted_at DESC, code",
            COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by key, deleted or not.
    pub async fn get(&self, code: &str, packaging: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE code = ?1 AND packaging = ?2",
            columns(self.caps)
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .bind(packaging)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Case-insensitive substring search over code, name and packaging.
    ///
    /// An empty query returns the first `limit` active products.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching products");

        let sql = format!(
            r#"SELECT {} FROM products
            WHERE (code LIKE ?1 ESCAPE '\' OR name LIKE ?1 ESCAPE '\' OR packaging LIKE ?1 ESCAPE '\'){}
            ORDER BY code, packaging
            LIMIT ?2"#,
            columns(self.caps),
            active_filter(self.caps)
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the key exists (possibly soft-deleted)
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, packaging = %product.packaging, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                code, packaging, name, "type", quantity,
                sourcing_price_minor, selling_price_minor
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.code)
        .bind(&product.packaging)
        .bind(&product.name)
        .bind(&product.product_type)
        .bind(product.quantity)
        .bind(product.sourcing_price_minor)
        .bind(product.selling_price_minor)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::duplicate("product", product.key().to_string())
            }
            other => other,
        })?;

        info!(code = %product.code, packaging = %product.packaging, "Product added");
        Ok(())
    }

    /// Updates name, type, quantity and prices of an active product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, packaging = %product.packaging, "Updating product");

        let sql = format!(
            r#"UPDATE products SET
                name = ?3,
                "type" = ?4,
                quantity = ?5,
                sourcing_price_minor = ?6,
                selling_price_minor = ?7
            WHERE code = ?1 AND packaging = ?2{}"#,
            active_filter(self.caps)
        );
        let result = sqlx::query(&sql)
            .bind(&product.code)
            .bind(&product.packaging)
            .bind(&product.name)
            .bind(&product.product_type)
            .bind(product.quantity)
            .bind(product.sourcing_price_minor)
            .bind(product.selling_price_minor)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.key().to_string()));
        }

        Ok(())
    }

    /// Adds `quantity` units in one statement and returns the new level.
    ///
    /// ## Delta Update
    /// ```text
    /// ❌ read quantity, add locally, write back   (lost update)
    /// ✅ UPDATE products SET quantity = quantity + ?
    /// ```
    pub async fn add_stock(&self, code: &str, packaging: &str, quantity: i64) -> DbResult<i64> {
        validate_quantity(quantity)?;
        debug!(code = %code, packaging = %packaging, quantity = %quantity, "Adding stock");

        let sql = format!(
            "UPDATE products SET quantity = quantity + ?3 \
             WHERE code = ?1 AND packaging = ?2{} RETURNING quantity",
            active_filter(self.caps)
        );
        let level: Option<i64> = sqlx::query_scalar(&sql)
            .bind(code)
            .bind(packaging)
            .bind(quantity)
            .fetch_optional(&self.pool)
            .await?;

        let level = level
            .ok_or_else(|| DbError::not_found("Product", ProductKey::new(code, packaging).to_string()))?;

        info!(code = %code, packaging = %packaging, added = quantity, level = level, "Stock added");
        Ok(level)
    }

    /// Marks an active product deleted.
    pub async fn soft_delete(&self, code: &str, packaging: &str) -> DbResult<()> {
        if !self.caps.soft_delete {
            return Err(self.schema_mismatch("Soft delete"));
        }
        debug!(code = %code, packaging = %packaging, "Soft-deleting product");

        let result = sqlx::query(
            "UPDATE products SET deleted = 1, deleted_at = ?3 \
             WHERE code = ?1 AND packaging = ?2 AND deleted = 0",
        )
        .bind(code)
        .bind(packaging)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", ProductKey::new(code, packaging).to_string()));
        }

        info!(code = %code, packaging = %packaging, "Product moved to deleted");
        Ok(())
    }

    /// Brings a soft-deleted product back.
    pub async fn restore(&self, code: &str, packaging: &str) -> DbResult<()> {
        if !self.caps.soft_delete {
            return Err(self.schema_mismatch("Restore"));
        }

        let result = sqlx::query(
            "UPDATE products SET deleted = 0, deleted_at = NULL \
             WHERE code = ?1 AND packaging = ?2 AND deleted = 1",
        )
        .bind(code)
        .bind(packaging)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Deleted product",
                ProductKey::new(code, packaging).to_string(),
            ));
        }

        info!(code = %code, packaging = %packaging, "Product restored");
        Ok(())
    }

    /// Removes a soft-deleted product that has no sales.
    pub async fn hard_delete(&self, code: &str, packaging: &str) -> DbResult<()> {
        if !self.caps.soft_delete {
            return Err(self.schema_mismatch("Permanent delete"));
        }
        let key = ProductKey::new(code, packaging);

        let sales: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sales WHERE product_code = ?1 AND packaging = ?2",
        )
        .bind(code)
        .bind(packaging)
        .fetch_one(&self.pool)
        .await?;

        if sales > 0 {
            return Err(DbError::ReferenceViolation {
                message: format!("{} has {} recorded sale(s) and cannot be removed", key, sales),
            });
        }

        let result = sqlx::query(
            "DELETE FROM products WHERE code = ?1 AND packaging = ?2 AND deleted = 1",
        )
        .bind(code)
        .bind(packaging)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Deleted product", key.to_string()));
        }

        info!(code = %code, packaging = %packaging, "Product permanently deleted");
        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM products WHERE 1 = 1{}",
            active_filter(self.caps)
        );
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
