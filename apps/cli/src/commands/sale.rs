//! # Sale Commands
//!
//! Stages a cart, records it line by line and builds the receipt.
//!
//! ## Bulk Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► non-empty? ──► every line valid? ──► (no store call yet)    │
//! │                                                                         │
//! │  for line in lines (sequential):                                       │
//! │     store.record_sale(line)   atomic: check, decrement, snapshot       │
//! │        ├── Ok  ──► committed.push(sale)                                │
//! │        └── Err ──► stop; earlier lines stay committed                  │
//! │                                                                         │
//! │  any commit ──► cache refresh (products + sales)                       │
//! │  success    ──► receipt from the submitted cart snapshot               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed batch is not rolled back. [`BulkSaleFailure`] says exactly which
//! sales committed and which product stopped the batch.

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::commands::{refresh_after_write, Refresh};
use crate::error::ApiError;
use crate::state::{ConfigState, InventoryCache};
use tally_core::cart::checkout_cart;
use tally_core::validation::validate_sale_line;
use tally_core::{Cart, CoreError, Money, Product, ProductKey, Receipt, Sale, SaleLine};
use tally_db::InventoryStore;

/// One requested line: `CODE/PACKAGING=QTY[@PRICE]` on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemRequest {
    pub code: String,
    pub packaging: String,
    pub quantity: i64,
    pub price: Option<Money>,
}

/// A committed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub sales: Vec<Sale>,
    pub receipt: Receipt,
}

/// A bulk sale that stopped before its last line.
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{}{}", failure_message(.failed, .error), committed_note(.committed))]
pub struct BulkSaleFailure {
    /// Sales recorded before the failure. Empty when nothing was sent.
    pub committed: Vec<Sale>,
    /// The line that failed; `None` when the request was rejected up front.
    pub failed: Option<ProductKey>,
    pub error: ApiError,
}

impl BulkSaleFailure {
    fn rejected(error: impl Into<ApiError>) -> Self {
        BulkSaleFailure {
            committed: Vec::new(),
            failed: None,
            error: error.into(),
        }
    }

    /// True when part of the batch committed.
    pub fn is_partial(&self) -> bool {
        !self.committed.is_empty()
    }
}

fn failure_message(failed: &Option<ProductKey>, error: &ApiError) -> String {
    match failed {
        Some(key) => format!("{} failed: {}", key, error.message),
        None => error.message.clone(),
    }
}

fn committed_note(committed: &[Sale]) -> String {
    if committed.is_empty() {
        return String::new();
    }
    format!(" ({} earlier item(s) were recorded and remain sold)", committed.len())
}

/// Keeps the error code; the message says what committed.
impl From<BulkSaleFailure> for ApiError {
    fn from(failure: BulkSaleFailure) -> Self {
        ApiError::new(failure.error.code, failure.to_string())
    }
}

/// Builds a cart from requested lines against the cached catalog.
///
/// Repeated codes merge into one line. A code already in the cart under a
/// different packaging is refused, since the cart holds one line per code.
pub async fn stage_cart(cache: &InventoryCache, items: &[SaleItemRequest]) -> Result<Cart, ApiError> {
    let mut cart = Cart::new();

    for item in items {
        let product = cache
            .find_product(&item.code, &item.packaging)
            .await
            .ok_or_else(|| {
                ApiError::not_found("Product", &ProductKey::new(&item.code, &item.packaging).to_string())
            })?;

        if let Some(line) = cart.line(&product.code) {
            if line.packaging != product.packaging {
                return Err(ApiError::cart(format!(
                    "{} is already in the cart as {}; sell {} in a separate sale",
                    product.code,
                    line.packaging,
                    product.key()
                )));
            }
        }

        cart.add_item(Some(&product), item.quantity)?;
        if let Some(price) = item.price {
            cart.update_price(&product.code, price)?;
        }
    }

    debug!(lines = cart.item_count(), total = %cart.total(), "Cart staged");
    Ok(cart)
}

/// Records every line in order, one atomic store call each.
///
/// ## Errors
/// - Empty `lines`, or any line with quantity < 1 or a negative price:
///   rejected before the first store call
/// - First store failure: returned with the sales committed before it
pub async fn record_bulk_sale(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    lines: &[SaleLine],
) -> Result<Vec<Sale>, BulkSaleFailure> {
    debug!(lines = lines.len(), "record_bulk_sale command");

    if lines.is_empty() {
        return Err(BulkSaleFailure::rejected(CoreError::EmptySale));
    }
    for line in lines {
        validate_sale_line(line).map_err(BulkSaleFailure::rejected)?;
    }

    let mut committed: Vec<Sale> = Vec::with_capacity(lines.len());
    for line in lines {
        match store.record_sale(line).await {
            Ok(sale) => {
                info!(
                    sale_id = %sale.id,
                    key = %line.key(),
                    quantity = sale.quantity_sold,
                    revenue = %sale.revenue(),
                    "Sale recorded"
                );
                committed.push(sale);
            }
            Err(e) => {
                warn!(key = %line.key(), committed = committed.len(), error = %e, "Bulk sale stopped");
                if !committed.is_empty() {
                    refresh_after_write(store, cache, Refresh::All).await;
                }
                return Err(BulkSaleFailure {
                    committed,
                    failed: Some(line.key()),
                    error: e.into(),
                });
            }
        }
    }

    refresh_after_write(store, cache, Refresh::All).await;
    Ok(committed)
}

/// Submits the cart, or the selected product alone when the cart is empty,
/// and returns the sales with a receipt of what was submitted.
pub async fn checkout(
    store: &dyn InventoryStore,
    cache: &InventoryCache,
    config: &ConfigState,
    cart: &Cart,
    selected: Option<&Product>,
    quantity: i64,
) -> Result<CheckoutResult, BulkSaleFailure> {
    let snapshot = checkout_cart(cart, selected, quantity).map_err(BulkSaleFailure::rejected)?;

    let sales = record_bulk_sale(store, cache, &snapshot.to_sale_lines()).await?;
    let receipt = Receipt::from_cart(&snapshot, config.store_info(), Local::now().naive_local());

    info!(
        sales = sales.len(),
        items = receipt.total_items,
        total = %receipt.total,
        "Checkout complete"
    );
    Ok(CheckoutResult { sales, receipt })
}
