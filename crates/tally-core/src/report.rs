//! # Report Aggregator
//!
//! Date-range filtering, totals, top sellers, pagination and export tables
//! over the recorded sales.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DateRange ──resolve(now)──► ReportWindow [start, end] (inclusive)     │
//! │                                   │                                     │
//! │  Vec<Sale> ───────────────────────┼──► aggregate() ──► SalesReport     │
//! │                                                         │               │
//! │                         ┌───────────────┬───────────────┤               │
//! │                         ▼               ▼               ▼               │
//! │                      page(n)     sales_table()    profit_table()        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Windows are anchored to local midnight in whatever time zone `now`
//! carries. Callers pass `Local::now()`; tests pass a fixed offset.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::export::CsvTable;
use crate::money::Money;
use crate::types::Sale;
use crate::{REPORT_PAGE_SIZE, TOP_PRODUCTS_LIMIT};

// =============================================================================
// Date Ranges
// =============================================================================

/// A named report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DateRange {
    Today,
    Yesterday,
    /// Sunday of the current week through today.
    Week,
    /// First of the current month through today.
    Month,
    /// Explicit dates; a missing bound defaults to today.
    Custom {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

/// Resolved, inclusive time bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

impl DateRange {
    /// Resolves the range against `now`.
    ///
    /// The start bound is the start of the first local day and the end bound
    /// is one nanosecond before the day after the last day starts. A day
    /// whose midnight falls in a DST gap starts at the first wall-clock
    /// minute after the gap.
    ///
    /// ## Errors
    /// Returns a validation error only for dates at the edge of the
    /// calendar (`NaiveDate::MAX`).
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CoreResult<ReportWindow> {
        let tz = now.timezone();
        let today = now.date_naive();

        let (first, last) = match *self {
            DateRange::Today => (today, today),
            DateRange::Yesterday => {
                let day = today - Duration::days(1);
                (day, day)
            }
            DateRange::Week => {
                let back = i64::from(today.weekday().num_days_from_sunday());
                (today - Duration::days(back), today)
            }
            DateRange::Month => (today.with_day(1).unwrap_or(today), today),
            DateRange::Custom { from, to } => (from.unwrap_or(today), to.unwrap_or(today)),
        };

        let after_last = last.succ_opt().ok_or_else(|| ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: format!("{} is the last representable day", last),
        })?;

        Ok(ReportWindow {
            start: start_of_day(&tz, first)?,
            end: start_of_day(&tz, after_last)? - Duration::nanoseconds(1),
        })
    }
}

/// Longest DST gap searched for the start of a day.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// First instant of local `date` as UTC.
///
/// Midnight inside a gap rolls forward to the first minute that exists;
/// an ambiguous midnight (clocks going back) resolves to the earlier instant.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> CoreResult<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=MAX_GAP_MINUTES)
        .find_map(|m| tz.from_local_datetime(&(midnight + Duration::minutes(m))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: format!("{} has no local time in this time zone", date),
            }
            .into()
        })
}

// =============================================================================
// Aggregation
// =============================================================================

/// Units sold per product code within a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_code: String,
    /// Name from the first matching sale row.
    pub name: String,
    pub quantity_sold: i64,
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub window: ReportWindow,
    /// Sales inside the window, in input order.
    pub sales: Vec<Sale>,
    pub total_revenue: Money,
    pub total_profit: Money,
    pub total_sold: i64,
    pub transactions: usize,
    pub top_products: Vec<TopProduct>,
}

/// Filters `sales` to `window` and computes the report figures.
///
/// Profit uses each sale's own sourcing price snapshot, never the live
/// product cost.
pub fn aggregate(sales: &[Sale], window: &ReportWindow) -> SalesReport {
    let filtered: Vec<Sale> = sales
        .iter()
        .filter(|s| window.contains(s.date))
        .cloned()
        .collect();

    let total_revenue = filtered.iter().map(Sale::revenue).sum();
    let total_profit = filtered.iter().map(Sale::profit).sum();
    let total_sold = filtered.iter().fold(0i64, |acc, s| acc.saturating_add(s.quantity_sold));

    SalesReport {
        window: *window,
        transactions: filtered.len(),
        top_products: top_products(&filtered, TOP_PRODUCTS_LIMIT),
        sales: filtered,
        total_revenue,
        total_profit,
        total_sold,
    }
}

/// Groups by product code and ranks by summed quantity, descending.
///
/// Ties keep first-encountered order (`sort_by` is stable).
pub fn top_products(sales: &[Sale], limit: usize) -> Vec<TopProduct> {
    let mut ranked: Vec<TopProduct> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sale in sales {
        match index.get(sale.product_code.as_str()) {
            Some(&i) => {
                ranked[i].quantity_sold = ranked[i].quantity_sold.saturating_add(sale.quantity_sold)
            }
            None => {
                index.insert(sale.product_code.as_str(), ranked.len());
                ranked.push(TopProduct {
                    product_code: sale.product_code.clone(),
                    name: sale.name.clone(),
                    quantity_sold: sale.quantity_sold,
                });
            }
        }
    }

    ranked.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually returned (after clamping).
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// `ceil(total / page_size)`; zero for an empty list.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Clamps a requested page into `[1, total_pages]` (page 1 when empty).
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// Slices out page `requested`, clamping it first.
pub fn paginate<T: Clone>(items: &[T], requested: usize, page_size: usize) -> Page<T> {
    let total_pages = total_pages(items.len(), page_size);
    let page = clamp_page(requested, total_pages);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items: items.len(),
    }
}

impl SalesReport {
    /// Page `n` of the filtered sales at the fixed report page size.
    pub fn page(&self, n: usize) -> Page<Sale> {
        paginate(&self.sales, n, REPORT_PAGE_SIZE)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.sales.len(), REPORT_PAGE_SIZE)
    }

    // =========================================================================
    // Export Tables
    // =========================================================================

    /// One row per filtered sale: date, code, name, packaging, quantity,
    /// unit price, line revenue. Dates are rendered in `tz`.
    pub fn sales_table<Tz>(&self, tz: &Tz) -> CsvTable
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut table = CsvTable::new([
            "Date",
            "Product Code",
            "Name",
            "Packaging",
            "Qty Sold",
            "Selling Price",
            "Total Sale",
        ]);
        for sale in &self.sales {
            table.push_row(vec![
                sale.date.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
                sale.product_code.clone(),
                sale.name.clone(),
                sale.packaging.clone(),
                sale.quantity_sold.to_string(),
                sale.selling_price().to_string(),
                sale.revenue().to_string(),
            ]);
        }
        table
    }

    /// One row per filtered sale: code, name, quantity, profit per unit,
    /// line profit.
    pub fn profit_table(&self) -> CsvTable {
        let mut table = CsvTable::new([
            "Product Code",
            "Name",
            "Qty Sold",
            "Profit/Unit",
            "Total Profit",
        ]);
        for sale in &self.sales {
            table.push_row(vec![
                sale.product_code.clone(),
                sale.name.clone(),
                sale.quantity_sold.to_string(),
                sale.profit_per_unit().to_string(),
                sale.profit().to_string(),
            ]);
        }
        table
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDateTime};

    fn pkt() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600).unwrap()
    }

    /// Wednesday 2026-03-18 14:30 local.
    fn now() -> DateTime<FixedOffset> {
        pkt().with_ymd_and_hms(2026, 3, 18, 14, 30, 0).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        pkt()
            .with_ymd_and_hms(y, m, d, h, mi, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sale(code: &str, qty: i64, sell: i64, cost: i64, date: DateTime<Utc>) -> Sale {
        Sale {
            id: format!("{}-{}", code, date.timestamp()),
            date,
            product_code: code.to_string(),
            name: format!("Name {}", code),
            packaging: "Box".to_string(),
            quantity_sold: qty,
            selling_price_minor: sell,
            sourcing_price_minor: cost,
        }
    }

    #[test]
    fn test_today_excludes_last_second_of_yesterday() {
        let window = DateRange::Today.resolve(&now()).unwrap();
        let late_yesterday = sale("A", 1, 100, 50, local(2026, 3, 17, 23, 59, 59));
        let early_today = sale("B", 1, 100, 50, local(2026, 3, 18, 0, 0, 0));
        let late_today = sale("C", 1, 100, 50, local(2026, 3, 18, 23, 59, 59));

        let report = aggregate(&[late_yesterday, early_today, late_today], &window);
        let codes: Vec<_> = report.sales.iter().map(|s| s.product_code.as_str()).collect();
        assert_eq!(codes, vec!["B", "C"]);
    }

    #[test]
    fn test_range_bounds() {
        let yesterday = DateRange::Yesterday.resolve(&now()).unwrap();
        assert_eq!(yesterday.start, local(2026, 3, 17, 0, 0, 0));
        assert!(yesterday.contains(local(2026, 3, 17, 23, 59, 59)));
        assert!(!yesterday.contains(local(2026, 3, 18, 0, 0, 0)));

        // 2026-03-15 is a Sunday.
        let week = DateRange::Week.resolve(&now()).unwrap();
        assert_eq!(week.start, local(2026, 3, 15, 0, 0, 0));

        let month = DateRange::Month.resolve(&now()).unwrap();
        assert_eq!(month.start, local(2026, 3, 1, 0, 0, 0));
        assert!(month.contains(local(2026, 3, 18, 23, 59, 59)));
    }

    #[test]
    fn test_custom_range_defaults_to_today() {
        let open = DateRange::Custom { from: None, to: None }.resolve(&now()).unwrap();
        assert_eq!(open, DateRange::Today.resolve(&now()).unwrap());

        let from = NaiveDate::from_ymd_opt(2026, 2, 1);
        let window = DateRange::Custom { from, to: None }.resolve(&now()).unwrap();
        assert_eq!(window.start, local(2026, 2, 1, 0, 0, 0));
        assert!(window.contains(local(2026, 3, 18, 22, 0, 0)));
    }

    #[test]
    fn test_totals() {
        let window = DateRange::Today.resolve(&now()).unwrap();
        let at = local(2026, 3, 18, 10, 0, 0);
        let report = aggregate(&[sale("A", 2, 100, 60, at), sale("B", 1, 50, 30, at)], &window);

        assert_eq!(report.total_revenue.minor(), 250);
        assert_eq!(report.total_profit.minor(), 100);
        assert_eq!(report.total_sold, 3);
        assert_eq!(report.transactions, 2);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let window = DateRange::Today.resolve(&now()).unwrap();
        let at = local(2026, 3, 18, 10, 0, 0);
        let price = "50000000000000000".parse::<Money>().unwrap().minor();

        let report = aggregate(&[sale("A", 2, price, 0, at), sale("A", 1, price, 0, at)], &window);

        assert_eq!(report.total_revenue.minor(), i64::MAX);
        assert_eq!(report.total_profit.minor(), i64::MAX);
        assert_eq!(report.total_sold, 3);
    }

    /// UTC-4 until local midnight of 2026-09-06, when clocks jump to 01:00
    /// (UTC-3).
    #[derive(Debug, Clone, Copy)]
    struct MidnightSpringForward;

    impl MidnightSpringForward {
        fn gap_start() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2026, 9, 6).unwrap().and_time(NaiveTime::MIN)
        }

        fn before() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for MidnightSpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            MidnightSpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::gap_start();
            if *local < gap_start {
                LocalResult::Single(Self::before())
            } else if *local < gap_start + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::after())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::gap_start() + Duration::hours(4) {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    #[test]
    fn test_day_starting_in_dst_gap_rolls_forward() {
        let utc = |d: u32, h: u32| Utc.with_ymd_and_hms(2026, 9, d, h, 0, 0).unwrap();
        let now = MidnightSpringForward.from_utc_datetime(&utc(6, 15).naive_utc());

        let today = DateRange::Today.resolve(&now).unwrap();
        // 01:00 local at UTC-3
        assert_eq!(today.start, utc(6, 4));
        // 00:00 local on the 7th at UTC-3, minus a nanosecond
        assert_eq!(today.end, utc(7, 3) - Duration::nanoseconds(1));

        let yesterday = DateRange::Yesterday.resolve(&now).unwrap();
        assert_eq!(yesterday.start, utc(5, 4));
        assert_eq!(yesterday.end, utc(6, 4) - Duration::nanoseconds(1));

        assert!(DateRange::Week.resolve(&now).is_ok());
        assert!(DateRange::Month.resolve(&now).is_ok());
    }

    #[test]
    fn test_top_products_tie_keeps_first_seen() {
        let at = local(2026, 3, 18, 10, 0, 0);
        let sales = [sale("A", 3, 1, 1, at), sale("A", 2, 1, 1, at), sale("B", 5, 1, 1, at)];

        let top = top_products(&sales, TOP_PRODUCTS_LIMIT);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].product_code.as_str(), top[0].quantity_sold), ("A", 5));
        assert_eq!((top[1].product_code.as_str(), top[1].quantity_sold), ("B", 5));
    }

    #[test]
    fn test_top_products_limit() {
        let at = local(2026, 3, 18, 10, 0, 0);
        let sales: Vec<Sale> = (1..=7).map(|i| sale(&format!("P{}", i), i, 1, 1, at)).collect();

        let top = top_products(&sales, 5);
        let codes: Vec<_> = top.iter().map(|t| t.product_code.as_str()).collect();
        assert_eq!(codes, vec!["P7", "P6", "P5", "P4", "P3"]);
    }

    #[test]
    fn test_pagination_clamps() {
        let at = local(2026, 3, 18, 10, 0, 0);
        let sales: Vec<Sale> = (0..120).map(|_| sale("A", 1, 1, 1, at)).collect();
        let report = aggregate(&sales, &DateRange::Today.resolve(&now()).unwrap());

        assert_eq!(report.total_pages(), 3);
        let last = report.page(4);
        assert_eq!(last.page, 3);
        assert_eq!(last.items.len(), 20);
        assert_eq!(report.page(0).page, 1);
        assert_eq!(report.page(2).items.len(), 50);
    }

    #[test]
    fn test_empty_report_has_page_one() {
        let report = aggregate(&[], &DateRange::Today.resolve(&now()).unwrap());
        let page = report.page(3);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_exports_cover_filtered_set_only() {
        let window = DateRange::Today.resolve(&now()).unwrap();
        let sales = [
            sale("A", 2, 1000, 600, local(2026, 3, 18, 9, 15, 0)),
            sale("B", 1, 500, 700, local(2026, 3, 1, 9, 0, 0)),
        ];
        let report = aggregate(&sales, &window);

        let table = report.sales_table(&pkt());
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0],
            vec!["2026-03-18 09:15:00", "A", "Name A", "Box", "2", "10.00", "20.00"]
        );

        let profit = report.profit_table();
        assert_eq!(profit.rows[0], vec!["A", "Name A", "2", "4.00", "8.00"]);
    }
}
