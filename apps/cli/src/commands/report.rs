//! # Report Commands
//!
//! Date-range reports over the cached sales and their CSV exports.
//!
//! Exports always cover the filtered set of the report they are given,
//! never the full sales history.

use std::path::Path;

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::debug;

use crate::commands::write_csv;
use crate::error::ApiError;
use crate::state::InventoryCache;
use tally_core::report::aggregate;
use tally_core::{DateRange, Money, Page, ReportWindow, Sale, SalesReport, TopProduct};

/// A report as shown to the operator: the figures plus one page of sales.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub range: DateRange,
    pub window: ReportWindow,
    pub total_revenue: Money,
    pub total_profit: Money,
    pub total_sold: i64,
    pub transactions: usize,
    pub top_products: Vec<TopProduct>,
    pub page: Page<Sale>,
}

/// Aggregates the cached sales over `range` resolved against `now`.
pub async fn sales_report<Tz: TimeZone>(
    cache: &InventoryCache,
    range: DateRange,
    now: &DateTime<Tz>,
) -> Result<SalesReport, ApiError> {
    let window = range.resolve(now)?;
    let sales = cache.sales().await;
    let report = aggregate(&sales, &window);

    debug!(
        ?range,
        start = %window.start,
        end = %window.end,
        transactions = report.transactions,
        "Sales report built"
    );
    Ok(report)
}

/// Page `page` of `report`; out-of-range pages clamp to the last page.
pub fn report_view(range: DateRange, report: &SalesReport, page: usize) -> ReportView {
    ReportView {
        range,
        window: report.window,
        total_revenue: report.total_revenue,
        total_profit: report.total_profit,
        total_sold: report.total_sold,
        transactions: report.transactions,
        top_products: report.top_products.clone(),
        page: report.page(page),
    }
}

/// Writes the sales export; dates are rendered in `tz`.
///
/// ## Returns
/// Number of sale rows written.
pub fn export_sales<Tz>(report: &SalesReport, tz: &Tz, path: &Path) -> Result<usize, ApiError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    write_csv(&report.sales_table(tz), path)
}

/// Writes the profit export.
///
/// ## Returns
/// Number of sale rows written.
pub fn export_profit(report: &SalesReport, path: &Path) -> Result<usize, ApiError> {
    write_csv(&report.profit_table(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fake::{product, FakeStore};
    use crate::commands::sale::record_bulk_sale;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tally_core::SaleLine;
    use tally_db::InventoryStore;

    /// Sales are stamped at this instant and reports resolve against it.
    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    async fn sold_store() -> (FakeStore, InventoryCache) {
        let mut tiles = product("TIL-010", "Box", 10, 30, 50);
        tiles.name = "Tiles, White".to_string();
        let store = FakeStore::with_products(vec![product("PNT-001", "4L", 10, 60, 100), tiles]);
        store.stamp_sales_at(noon());
        let cache = InventoryCache::new();
        record_bulk_sale(
            &store,
            &cache,
            &[SaleLine::new("PNT-001", "4L", 2), SaleLine::new("TIL-010", "Box", 1)],
        )
        .await
        .unwrap();
        (store, cache)
    }

    #[tokio::test]
    async fn test_today_report_totals() {
        let (_store, cache) = sold_store().await;

        let report = sales_report(&cache, DateRange::Today, &noon()).await.unwrap();

        assert_eq!(report.transactions, 2);
        assert_eq!(report.total_revenue, Money::from_minor(250));
        assert_eq!(report.total_profit, Money::from_minor(100));
        assert_eq!(report.total_sold, 3);
        assert_eq!(report.top_products[0].product_code, "PNT-001");
    }

    #[tokio::test]
    async fn test_yesterday_excludes_todays_sales() {
        let (_store, cache) = sold_store().await;

        let report = sales_report(&cache, DateRange::Yesterday, &noon()).await.unwrap();
        assert_eq!(report.transactions, 0);
        assert_eq!(report.total_revenue, Money::zero());

        let view = report_view(DateRange::Yesterday, &report, 4);
        assert_eq!(view.page.page, 1);
        assert!(view.page.items.is_empty());
    }

    #[tokio::test]
    async fn test_custom_range_with_from_after_to_is_empty() {
        let (_store, cache) = sold_store().await;
        let today = noon().date_naive();

        let report = sales_report(
            &cache,
            DateRange::Custom {
                from: Some(today),
                to: Some(today - Duration::days(1)),
            },
            &noon(),
        )
        .await
        .unwrap();
        assert_eq!(report.transactions, 0);
    }

    #[tokio::test]
    async fn test_report_reads_refreshed_cache() {
        let (store, cache) = sold_store().await;
        store.record_sale(&SaleLine::new("PNT-001", "4L", 1)).await.unwrap();

        let before = sales_report(&cache, DateRange::Today, &noon()).await.unwrap();
        assert_eq!(before.transactions, 2);

        cache.refresh(&store).await.unwrap();
        let after = sales_report(&cache, DateRange::Today, &noon()).await.unwrap();
        assert_eq!(after.transactions, 3);
    }

    #[tokio::test]
    async fn test_exports_cover_filtered_sales() {
        let (_store, cache) = sold_store().await;
        let dir = tempfile::tempdir().unwrap();
        let report = sales_report(&cache, DateRange::Today, &noon()).await.unwrap();

        let sales_path = dir.path().join("sales.csv");
        assert_eq!(export_sales(&report, &Utc, &sales_path).unwrap(), 2);
        let text = std::fs::read_to_string(&sales_path).unwrap();
        assert!(text.starts_with("Date,Product Code,Name,Packaging,Qty Sold,Selling Price,Total Sale\n"));
        assert!(text.contains("\"Tiles, White\""));

        let profit_path = dir.path().join("profit.csv");
        assert_eq!(export_profit(&report, &profit_path).unwrap(), 2);
        let text = std::fs::read_to_string(&profit_path).unwrap();
        assert!(text.contains("PNT-001,PNT-001 item,2,0.40,0.80"));

        let empty = sales_report(&cache, DateRange::Yesterday, &noon()).await.unwrap();
        let empty_path = dir.path().join("empty.csv");
        assert_eq!(export_profit(&empty, &empty_path).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(&empty_path).unwrap(),
            "Product Code,Name,Qty Sold,Profit/Unit,Total Profit\n"
        );
    }
}
