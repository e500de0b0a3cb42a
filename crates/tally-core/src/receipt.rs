//! # Receipt
//!
//! Builds a receipt from the submitted cart snapshot and renders it as
//! fixed-width text for thermal printers.
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              STORE NAME                  │
//! │             address lines                │
//! │            SALES INVOICE                 │
//! │          2026-03-18 14:30                │
//! │------------------------------------------│
//! │1. Weather Shield                         │
//! │   Code: PNT-001 | 4L                     │
//! │   2 x Rs. 1200.00          Rs. 2400.00   │
//! │------------------------------------------│
//! │Total Items:                            2 │
//! │Products:                               1 │
//! │TOTAL AMOUNT                  Rs. 2400.00 │
//! │                                          │
//! │      Thank You for Your Business!        │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Generation never touches stored state and cannot fail.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::money::Money;

/// Header and currency details printed on every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub name: String,
    pub address_lines: Vec<String>,
    pub currency_symbol: String,
}

impl Default for StoreInfo {
    fn default() -> Self {
        StoreInfo {
            name: "Tally Store".to_string(),
            address_lines: Vec::new(),
            currency_symbol: "Rs.".to_string(),
        }
    }
}

/// A rendered-ready receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub store: StoreInfo,
    /// Local wall-clock time of the sale.
    pub issued_at: NaiveDateTime,
    pub lines: Vec<CartLine>,
    pub total_items: i64,
    pub product_count: usize,
    pub total: Money,
}

const FOOTER: [&str; 3] = [
    "Thank You for Your Business!",
    "We appreciate your trust in us.",
    "Visit us again!",
];

impl Receipt {
    pub fn from_cart(cart: &Cart, store: StoreInfo, issued_at: NaiveDateTime) -> Self {
        Receipt {
            store,
            issued_at,
            lines: cart.lines.clone(),
            total_items: cart.total_quantity(),
            product_count: cart.item_count(),
            total: cart.total(),
        }
    }

    /// Renders the receipt `width` characters wide.
    pub fn render_text(&self, width: usize) -> String {
        let symbol = self.store.currency_symbol.as_str();
        let rule = "-".repeat(width);
        let mut out: Vec<String> = Vec::new();

        out.push(center(&self.store.name, width));
        for line in &self.store.address_lines {
            out.push(center(line, width));
        }
        out.push(center("SALES INVOICE", width));
        out.push(center(&self.issued_at.format("%Y-%m-%d %H:%M").to_string(), width));
        out.push(rule.clone());

        for (i, line) in self.lines.iter().enumerate() {
            out.push(format!("{}. {}", i + 1, line.name));
            out.push(format!("   Code: {} | {}", line.code, line.packaging));
            let calc = format!(
                "   {} x {}",
                line.quantity,
                line.selling_price.format_with(symbol)
            );
            out.extend(columns(&calc, &line.line_total().format_with(symbol), width));
        }

        out.push(rule);
        out.extend(columns("Total Items:", &self.total_items.to_string(), width));
        out.extend(columns("Products:", &self.product_count.to_string(), width));
        out.extend(columns("TOTAL AMOUNT", &self.total.format_with(symbol), width));
        out.push(String::new());
        for line in FOOTER {
            out.push(center(line, width));
        }

        let mut text = out
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        text
    }
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}

/// `left` and `right` on one line, or on two when they do not fit.
fn columns(left: &str, right: &str, width: usize) -> Vec<String> {
    let used = left.chars().count() + right.chars().count();
    if used < width {
        return vec![format!("{}{}{}", left, " ".repeat(width - used), right)];
    }
    let pad = width.saturating_sub(right.chars().count());
    vec![left.to_string(), format!("{}{}", " ".repeat(pad), right)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::NaiveDate;

    fn cart() -> Cart {
        let product = Product {
            code: "PNT-001".to_string(),
            packaging: "4L".to_string(),
            name: "Weather Shield".to_string(),
            product_type: None,
            quantity: 10,
            sourcing_price_minor: 90000,
            selling_price_minor: 120000,
            deleted: false,
            deleted_at: None,
        };
        let mut cart = Cart::new();
        cart.add_item(Some(&product), 2).unwrap();
        cart
    }

    fn issued() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 18)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_receipt_summary() {
        let receipt = Receipt::from_cart(&cart(), StoreInfo::default(), issued());
        assert_eq!(receipt.total_items, 2);
        assert_eq!(receipt.product_count, 1);
        assert_eq!(receipt.total.minor(), 240000);
    }

    #[test]
    fn test_render_text() {
        let store = StoreInfo {
            name: "Paint House".to_string(),
            address_lines: vec!["Main Bazar".to_string()],
            currency_symbol: "Rs.".to_string(),
        };
        let text = Receipt::from_cart(&cart(), store, issued()).render_text(42);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].trim(), "Paint House");
        assert_eq!(lines[1].trim(), "Main Bazar");
        assert_eq!(lines[2].trim(), "SALES INVOICE");
        assert_eq!(lines[3].trim(), "2026-03-18 14:30");
        assert!(text.contains("1. Weather Shield\n"));
        assert!(text.contains("   Code: PNT-001 | 4L\n"));
        assert!(text.contains("2 x Rs. 1200.00"));

        let total = lines.iter().find(|l| l.starts_with("TOTAL AMOUNT")).unwrap();
        assert_eq!(total.chars().count(), 42);
        assert!(total.ends_with("Rs. 2400.00"));
        assert!(lines.iter().all(|l| l.chars().count() <= 42));
    }

    #[test]
    fn test_columns_wrap_when_too_long() {
        let out = columns("a very long left column", "right", 20);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], "               right");
    }
}
