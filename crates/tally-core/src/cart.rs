//! # Cart
//!
//! Transient staging area for a multi-item sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Operations                                  │
//! │                                                                         │
//! │  Operator Action         Operation              Cart Change             │
//! │  ───────────────         ─────────              ───────────             │
//! │                                                                         │
//! │  Pick product + qty ───► add_item() ──────────► merge by code / push   │
//! │                                                                         │
//! │  Change quantity ──────► update_quantity() ───► qty = max(n, 1)        │
//! │                                                                         │
//! │  Change price ─────────► update_price() ──────► price = max(p, 0)      │
//! │                                                                         │
//! │  Click remove ─────────► remove_item() ───────► line dropped           │
//! │                                                                         │
//! │  Checkout ─────────────► to_sale_lines() ─────► Vec<SaleLine>          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product code; adding a present code sums quantity
//! - Line quantity ≥ 1, line selling price ≥ 0
//! - The total is computed from the lines every time, never stored

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, SaleLine};
use crate::validation::MAX_QUANTITY;

/// A staged line.
///
/// Name, packaging and prices are frozen from the product when the line is
/// created. Only `selling_price` can be overridden afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub code: String,
    pub name: String,
    pub packaging: String,
    pub quantity: i64,
    pub selling_price: Money,
    pub sourcing_price: Money,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            code: product.code.clone(),
            name: product.name.clone(),
            packaging: product.packaging.clone(),
            quantity,
            selling_price: product.selling_price(),
            sourcing_price: product.sourcing_price(),
        }
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.selling_price.times(self.quantity)
    }

    /// The sale request for this line. The staged price is always sent as
    /// an override so that edits made in the cart are what gets recorded.
    pub fn to_sale_line(&self) -> SaleLine {
        SaleLine::new(&self.code, &self.packaging, self.quantity).with_price(self.selling_price)
    }
}

/// The cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product or increases the quantity of its existing line.
    ///
    /// ## Errors
    /// - [`CoreError::NoProductSelected`] when `product` is `None`
    /// - [`CoreError::InvalidQuantity`] when `quantity` (or the merged line
    ///   quantity) is outside `1..=MAX_QUANTITY`
    ///
    /// The cart is unchanged on error.
    pub fn add_item(&mut self, product: Option<&Product>, quantity: i64) -> CoreResult<()> {
        let product = product.ok_or(CoreError::NoProductSelected)?;
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(CoreError::InvalidQuantity(quantity));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.code == product.code) {
            let merged = line.quantity.saturating_add(quantity);
            if merged > MAX_QUANTITY {
                return Err(CoreError::InvalidQuantity(merged));
            }
            line.quantity = merged;
            return Ok(());
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets a line's quantity, clamped to `1..=MAX_QUANTITY`.
    pub fn update_quantity(&mut self, code: &str, quantity: i64) -> CoreResult<()> {
        let line = self.line_mut(code)?;
        line.quantity = quantity.clamp(1, MAX_QUANTITY);
        Ok(())
    }

    /// Overrides a line's selling price, clamped to at least 0.
    ///
    /// The sourcing price snapshot is left as is.
    pub fn update_price(&mut self, code: &str, price: Money) -> CoreResult<()> {
        let line = self.line_mut(code)?;
        line.selling_price = price.non_negative();
        Ok(())
    }

    pub fn remove_item(&mut self, code: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.code != code);
        if self.lines.len() == before {
            return Err(CoreError::NotInCart(code.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn line(&self, code: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.code == code)
    }

    fn line_mut(&mut self, code: &str) -> CoreResult<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.code == code)
            .ok_or_else(|| CoreError::NotInCart(code.to_string()))
    }

    /// Number of distinct lines ("Products" on the receipt).
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of line quantities ("Total Items" on the receipt).
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().fold(0, |acc, l| acc.saturating_add(l.quantity))
    }

    /// `Σ quantity × selling price`.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_sale_lines(&self) -> Vec<SaleLine> {
        self.lines.iter().map(CartLine::to_sale_line).collect()
    }
}

/// Resolves what a checkout submits.
///
/// A non-empty cart is submitted as is. An empty cart with a selected
/// product becomes a one-line cart of that product at `quantity`, so the
/// receipt can be generated from the same snapshot.
///
/// ## Errors
/// - [`CoreError::EmptySale`] when the cart is empty and nothing is selected
/// - [`CoreError::InvalidQuantity`] for the single-item quantity
pub fn checkout_cart(cart: &Cart, selected: Option<&Product>, quantity: i64) -> CoreResult<Cart> {
    if !cart.is_empty() {
        return Ok(cart.clone());
    }

    let product = selected.ok_or(CoreError::EmptySale)?;
    let mut single = Cart::new();
    single.add_item(Some(product), quantity)?;
    Ok(single)
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, sell: i64, cost: i64) -> Product {
        Product {
            code: code.to_string(),
            packaging: "1L".to_string(),
            name: format!("Product {}", code),
            product_type: Some("Paint".to_string()),
            quantity: 20,
            sourcing_price_minor: cost,
            selling_price_minor: sell,
            deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn test_add_same_code_merges_lines() {
        let mut cart = Cart::new();
        let p = product("PNT-001", 1000, 600);

        cart.add_item(Some(&p), 2).unwrap();
        cart.add_item(Some(&p), 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.line("PNT-001").unwrap().quantity, 5);
        assert_eq!(cart.total().minor(), 5000);
    }

    #[test]
    fn test_add_rejects_missing_product_and_bad_quantity() {
        let mut cart = Cart::new();
        let p = product("PNT-001", 1000, 600);

        assert!(matches!(
            cart.add_item(None, 1),
            Err(CoreError::NoProductSelected)
        ));
        assert!(matches!(
            cart.add_item(Some(&p), 0),
            Err(CoreError::InvalidQuantity(0))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_cannot_exceed_max_quantity() {
        let mut cart = Cart::new();
        let p = product("PNT-001", 1000, 600);

        assert!(cart.add_item(Some(&p), MAX_QUANTITY + 1).is_err());
        cart.add_item(Some(&p), MAX_QUANTITY).unwrap();
        assert!(matches!(
            cart.add_item(Some(&p), 1),
            Err(CoreError::InvalidQuantity(n)) if n == MAX_QUANTITY + 1
        ));
        assert_eq!(cart.line("PNT-001").unwrap().quantity, MAX_QUANTITY);

        cart.update_quantity("PNT-001", i64::MAX).unwrap();
        assert_eq!(cart.total_quantity(), MAX_QUANTITY);
    }

    #[test]
    fn test_updates_clamp() {
        let mut cart = Cart::new();
        cart.add_item(Some(&product("A", 1000, 600)), 4).unwrap();

        cart.update_quantity("A", 0).unwrap();
        assert_eq!(cart.line("A").unwrap().quantity, 1);

        cart.update_price("A", Money::from_minor(-250)).unwrap();
        let line = cart.line("A").unwrap();
        assert_eq!(line.selling_price, Money::zero());
        assert_eq!(line.sourcing_price.minor(), 600);

        assert!(cart.update_quantity("B", 3).is_err());
    }

    #[test]
    fn test_total_tracks_every_change() {
        let mut cart = Cart::new();
        cart.add_item(Some(&product("A", 1000, 600)), 2).unwrap();
        cart.add_item(Some(&product("B", 500, 300)), 1).unwrap();
        assert_eq!(cart.total().minor(), 2500);

        cart.update_price("A", Money::from_minor(900)).unwrap();
        assert_eq!(cart.total().minor(), 2300);

        cart.remove_item("B").unwrap();
        assert_eq!(cart.total().minor(), 1800);
        assert!(cart.remove_item("B").is_err());

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 2);
    }

    #[test]
    fn test_sale_lines_carry_staged_price() {
        let mut cart = Cart::new();
        cart.add_item(Some(&product("A", 1000, 600)), 2).unwrap();
        cart.update_price("A", Money::from_minor(950)).unwrap();

        let lines = cart.to_sale_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity_sold, 2);
        assert_eq!(lines[0].selling_price, Some(Money::from_minor(950)));
    }

    #[test]
    fn test_checkout_single_item_fallback() {
        let p = product("A", 1000, 600);

        let single = checkout_cart(&Cart::new(), Some(&p), 3).unwrap();
        assert_eq!(single.total_quantity(), 3);

        assert!(matches!(
            checkout_cart(&Cart::new(), None, 1),
            Err(CoreError::EmptySale)
        ));

        let mut cart = Cart::new();
        cart.add_item(Some(&product("B", 100, 50)), 1).unwrap();
        let submitted = checkout_cart(&cart, Some(&p), 3).unwrap();
        assert_eq!(submitted, cart);
    }
}
