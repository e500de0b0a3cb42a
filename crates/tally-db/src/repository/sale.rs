//! # Sale Repository
//!
//! The sales log and the atomic sale operation.
//!
//! ## record_sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  One transaction per sale line                          │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE products SET quantity = quantity - :qty                       │
//! │     WHERE key AND quantity >= :qty AND deleted = 0                      │
//! │     RETURNING *            ── no row? ──► InsufficientStock / NotFound  │
//! │        │                                   (ROLLBACK)                   │
//! │        ▼                                                                │
//! │    INSERT INTO sales (snapshot of name, packaging, both prices)         │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The check and the decrement are one statement, so two tills selling   │
//! │  the last unit cannot both succeed.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::migrations::SchemaCapabilities;
use crate::repository::product::{active_filter, columns};
use tally_core::validation::validate_sale_line;
use tally_core::{Product, Sale, SaleLine};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    caps: SchemaCapabilities,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, caps: SchemaCapabilities) -> Self {
        SaleRepository { pool, caps }
    }

    /// All sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, date, product_code, name, packaging, quantity_sold,
                   selling_price_minor, sourcing_price_minor
            FROM sales
            ORDER BY date DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Records one sale line atomically.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - the committed row
    /// * `Err(DbError::InsufficientStock)` - product exists with less stock
    /// * `Err(DbError::NotFound)` - no active product with that key
    /// * `Err(DbError::Validation)` - quantity < 1 or negative price override
    pub async fn record(&self, line: &SaleLine) -> DbResult<Sale> {
        validate_sale_line(line)?;
        debug!(
            code = %line.product_code,
            packaging = %line.packaging,
            quantity = line.quantity_sold,
            "Recording sale"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let decrement = format!(
            "UPDATE products SET quantity = quantity - ?3 \
             WHERE code = ?1 AND packaging = ?2 AND quantity >= ?3{} \
             RETURNING {}",
            active_filter(self.caps),
            columns(self.caps)
        );
        let product = sqlx::query_as::<_, Product>(&decrement)
            .bind(&line.product_code)
            .bind(&line.packaging)
            .bind(line.quantity_sold)
            .fetch_optional(&mut *tx)
            .await?;

        let product = match product {
            Some(p) => p,
            None => {
                let lookup = format!(
                    "SELECT quantity FROM products WHERE code = ?1 AND packaging = ?2{}",
                    active_filter(self.caps)
                );
                let available: Option<i64> = sqlx::query_scalar(&lookup)
                    .bind(&line.product_code)
                    .bind(&line.packaging)
                    .fetch_optional(&mut *tx)
                    .await?;

                let err = match available {
                    Some(available) => DbError::InsufficientStock {
                        code: line.product_code.clone(),
                        packaging: line.packaging.clone(),
                        available,
                        requested: line.quantity_sold,
                    },
                    None => DbError::not_found("Product", line.key().to_string()),
                };
                warn!(error = %err, "Sale rejected");
                return Err(err);
            }
        };

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            product_code: product.code.clone(),
            name: product.name.clone(),
            packaging: product.packaging.clone(),
            quantity_sold: line.quantity_sold,
            selling_price_minor: line
                .selling_price
                .map(|p| p.minor())
                .unwrap_or(product.selling_price_minor),
            sourcing_price_minor: product.sourcing_price_minor,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, date, product_code, name, packaging, quantity_sold,
                selling_price_minor, sourcing_price_minor
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.date)
        .bind(&sale.product_code)
        .bind(&sale.name)
        .bind(&sale.packaging)
        .bind(sale.quantity_sold)
        .bind(sale.selling_price_minor)
        .bind(sale.sourcing_price_minor)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %sale.id,
            code = %sale.product_code,
            quantity = sale.quantity_sold,
            remaining = product.quantity,
            "Sale recorded"
        );
        Ok(sale)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
