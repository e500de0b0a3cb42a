//! # Validation Module
//!
//! Input validation for the catalog, cart and sale request paths.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (before any store call)                          │
//! │  ├── Required fields, trimming, code upper-casing                      │
//! │  └── Quantity / price ranges                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store (SQLite)                                               │
//! │  ├── PRIMARY KEY (code, packaging), UNIQUE type names                  │
//! │  └── CHECK (quantity >= 0), conditional stock decrement                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, ProductDraft, SaleLine};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_CODE_LEN: usize = 50;
pub const MAX_TEXT_LEN: usize = 200;

/// Largest quantity accepted on a line, a stock addition or a product.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest unit price accepted (1,000,000,000.00).
/// `MAX_PRICE × MAX_QUANTITY` fits comfortably in an `i64`.
pub const MAX_PRICE: Money = Money::from_minor(100_000_000_000);

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and fails with `Required` when nothing is left.
pub fn require_trimmed(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Normalizes a product code: trimmed and upper-cased.
///
/// ## Example
/// ```rust
/// use tally_core::validation::normalize_code;
///
/// assert_eq!(normalize_code(" pnt-001 ").unwrap(), "PNT-001");
/// assert!(normalize_code("   ").is_err());
/// ```
pub fn normalize_code(code: &str) -> ValidationResult<String> {
    require_trimmed("code", code, MAX_CODE_LEN).map(|c| c.to_uppercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantity for a sale line, a cart add or a stock addition: 1 to [`MAX_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Stock on hand: 0 to [`MAX_QUANTITY`].
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Prices run from zero (free items) to [`MAX_PRICE`]. The range is
/// reported in major units.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE.whole(),
        });
    }
    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates catalog form input and builds the product to insert.
///
/// ## Rules
/// - code, name, packaging and type are required after trimming
/// - code is upper-cased
/// - quantity ≥ 0, prices ≥ 0
pub fn validate_new_product(draft: &ProductDraft) -> ValidationResult<Product> {
    let code = normalize_code(&draft.code)?;
    let name = require_trimmed("name", &draft.name, MAX_TEXT_LEN)?;
    let packaging = require_trimmed("packaging", &draft.packaging, MAX_TEXT_LEN)?;
    let product_type = require_trimmed("type", &draft.product_type, MAX_TEXT_LEN)?;

    validate_stock_quantity(draft.quantity)?;
    validate_price("sourcing price", draft.sourcing_price)?;
    validate_price("selling price", draft.selling_price)?;

    Ok(Product {
        code,
        packaging,
        name,
        product_type: Some(product_type),
        quantity: draft.quantity,
        sourcing_price_minor: draft.sourcing_price.minor(),
        selling_price_minor: draft.selling_price.minor(),
        deleted: false,
        deleted_at: None,
    })
}

/// Validates an edited product. Keys are not editable; the type may be cleared.
pub fn validate_product_edit(product: &Product) -> ValidationResult<()> {
    require_trimmed("code", &product.code, MAX_CODE_LEN)?;
    require_trimmed("packaging", &product.packaging, MAX_TEXT_LEN)?;
    require_trimmed("name", &product.name, MAX_TEXT_LEN)?;
    validate_stock_quantity(product.quantity)?;
    validate_price("sourcing price", product.sourcing_price())?;
    validate_price("selling price", product.selling_price())?;
    Ok(())
}

/// Validates one line of a sale request.
pub fn validate_sale_line(line: &SaleLine) -> ValidationResult<()> {
    require_trimmed("product code", &line.product_code, MAX_CODE_LEN)?;
    require_trimmed("packaging", &line.packaging, MAX_TEXT_LEN)?;
    validate_quantity(line.quantity_sold)?;
    if let Some(price) = line.selling_price {
        validate_price("selling price", price)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
