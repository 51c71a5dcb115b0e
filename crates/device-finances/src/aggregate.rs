//! Data aggregation for the device charts
//!
//! Turns raw per-procedure revenue records and the SAP expense map into one
//! row per date-axis entry, carrying monthly and cumulative revenue/expense,
//! the capex line, the depreciation schedule and the presentation hints the
//! chart adapter consumes (future marker, break-even classification).

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::warn;

use crate::constants;
use crate::dataset::ProcedureRecord;
use crate::devices::Device;
use crate::expenses::{self, ExpenseMap};

/// Break-even colour classification of the cumulative revenue line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEvenClass {
    /// Cumulative revenue is negative
    Negative,
    /// Positive but still below the device's capex
    BelowCapex,
    /// At or above capex
    Reached,
}

/// One chart row, derived per date-axis entry
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub date: NaiveDate,
    pub monthly_revenue: f64,
    pub cumulative_revenue: f64,
    pub monthly_expense: f64,
    pub cumulative_expense: f64,
    /// Constant capex line (the break-even target)
    pub capex: f64,
    /// Straight-line depreciation for this month, 0 once fully depreciated
    pub depreciation: f64,
    /// Date lies strictly after today
    pub is_future: bool,
    pub break_even: BreakEvenClass,
}

fn classify(cumulative_revenue: f64, capex: f64) -> BreakEvenClass {
    if cumulative_revenue < 0.0 {
        BreakEvenClass::Negative
    } else if capex > 0.0 && cumulative_revenue < capex {
        BreakEvenClass::BelowCapex
    } else {
        BreakEvenClass::Reached
    }
}

/// Aggregate per-procedure records into date-aligned chart rows.
///
/// Returns exactly one row per `date_axis` entry, in axis order. All lookup
/// misses degrade to zero; an empty axis yields an empty result. Future rows
/// (strictly after `today`) carry zero monthly revenue and expense. While
/// `service_filter` is active, SAP expense and depreciation are suppressed,
/// but the depreciation counter still consumes the first `dep_months` rows
/// so the schedule stays anchored to the start of the axis.
pub fn aggregate(
    device: &Device,
    records: &[ProcedureRecord],
    expense_map: &ExpenseMap,
    date_axis: &[NaiveDate],
    today: Option<NaiveDate>,
    service_filter: Option<&str>,
) -> Vec<AggregatedRow> {
    if date_axis.is_empty() {
        warn!(ae_title = %device.ae_title, "empty date axis, nothing to aggregate");
        return Vec::new();
    }

    // Bucket revenue by year-month for the selected device (and service).
    let mut monthly_revenue: HashMap<&str, f64> = HashMap::new();
    for record in records {
        if record.ae_title != device.ae_title {
            continue;
        }
        if let Some(code) = service_filter {
            if record.service_code != code {
                continue;
            }
        }
        if record.year_month.is_empty() {
            continue;
        }
        *monthly_revenue.entry(record.year_month.as_str()).or_insert(0.0) += record.revenue_pl;
    }

    let mut cumulative_revenue = 0.0;
    let mut cumulative_expense = 0.0;
    let mut dep_counter = 0u32;
    let mut rows = Vec::with_capacity(date_axis.len());

    for &date in date_axis {
        let year_month = date.format(constants::YEAR_MONTH_FORMAT).to_string();
        let is_future = today.is_some_and(|t| date > t);

        let row_revenue = if is_future {
            0.0
        } else {
            monthly_revenue.get(year_month.as_str()).copied().unwrap_or(0.0)
        };
        cumulative_revenue += row_revenue;

        let row_expense = if is_future || service_filter.is_some() {
            0.0
        } else {
            expenses::monthly_expense(expense_map, &device.order_num, &year_month)
        };
        cumulative_expense += row_expense;

        // The counter advances whenever depreciation months remain, so the
        // schedule occupies the first dep_months axis entries even while a
        // service filter zeroes the reported amount.
        let mut depreciation = 0.0;
        if dep_counter < device.dep_months {
            if service_filter.is_none() {
                depreciation = device.monthly_dep;
            }
            dep_counter += 1;
        }

        rows.push(AggregatedRow {
            date,
            monthly_revenue: row_revenue,
            cumulative_revenue,
            monthly_expense: row_expense,
            cumulative_expense,
            capex: device.cap_ex,
            depreciation,
            is_future,
            break_even: classify(cumulative_revenue, device.cap_ex),
        });
    }

    rows
}

/// Index of the first row where cumulative revenue reaches capex, if any.
pub fn break_even_row(rows: &[AggregatedRow]) -> Option<usize> {
    let capex = rows.first()?.capex;
    if capex <= 0.0 {
        return None;
    }

    if rows[0].cumulative_revenue >= capex {
        return Some(0);
    }
    let mut prev = rows[0].cumulative_revenue;
    for (i, row) in rows.iter().enumerate().skip(1) {
        if prev < capex && row.cumulative_revenue >= capex {
            return Some(i);
        }
        prev = row.cumulative_revenue;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn device() -> Device {
        Device {
            ae_title: "CT01".to_string(),
            cap_ex: 1000.0,
            monthly_dep: 100.0,
            dep_months: 2,
            order_num: "4500".to_string(),
            bme_name: "CT Scanner".to_string(),
            brand: "Acme".to_string(),
            model: "X1".to_string(),
            install_date: None,
        }
    }

    fn record(ym: &str, code: &str, revenue: f64) -> ProcedureRecord {
        ProcedureRecord {
            ae_title: "CT01".to_string(),
            service_code: code.to_string(),
            service_name: code.to_string(),
            year_month: ym.to_string(),
            order_qty: 1,
            revenue_pl: revenue,
        }
    }

    fn axis() -> Vec<NaiveDate> {
        vec![d("2025-01-01"), d("2025-02-01"), d("2025-03-01")]
    }

    #[test]
    fn test_one_row_per_axis_entry_in_order() {
        let rows = aggregate(&device(), &[], &ExpenseMap::new(), &axis(), None, None);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().map(|r| r.date).collect::<Vec<_>>(),
            axis()
        );
    }

    #[test]
    fn test_empty_axis_yields_empty_result() {
        let rows = aggregate(&device(), &[], &ExpenseMap::new(), &[], None, None);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_reference_scenario() {
        // axis Jan..Mar, today mid-February, two billed months.
        let records = vec![record("2025-01", "A", 50.0), record("2025-02", "B", 80.0)];
        let rows = aggregate(
            &device(),
            &records,
            &ExpenseMap::new(),
            &axis(),
            Some(d("2025-02-15")),
            None,
        );

        assert_eq!(rows[0].monthly_revenue, 50.0);
        assert_eq!(rows[0].cumulative_revenue, 50.0);
        assert_eq!(rows[0].depreciation, 100.0);
        assert!(!rows[0].is_future);

        assert_eq!(rows[1].monthly_revenue, 80.0);
        assert_eq!(rows[1].cumulative_revenue, 130.0);
        assert_eq!(rows[1].depreciation, 100.0);

        // March is future: no revenue, cumulative unchanged, dep exhausted.
        assert!(rows[2].is_future);
        assert_eq!(rows[2].monthly_revenue, 0.0);
        assert_eq!(rows[2].cumulative_revenue, 130.0);
        assert_eq!(rows[2].depreciation, 0.0);
    }

    #[test]
    fn test_cumulative_is_running_sum() {
        let records = vec![
            record("2025-01", "A", 40.0),
            record("2025-01", "B", -15.0),
            record("2025-02", "A", 30.0),
            record("2025-03", "A", 10.0),
        ];
        let mut map = ExpenseMap::new();
        map.insert("4500-2025-01".to_string(), 20.0);
        map.insert("4500-2025-03".to_string(), 5.0);

        let rows = aggregate(&device(), &records, &map, &axis(), None, None);

        let mut rev = 0.0;
        let mut exp = 0.0;
        for row in &rows {
            rev += row.monthly_revenue;
            exp += row.monthly_expense;
            assert_eq!(row.cumulative_revenue, rev);
            assert_eq!(row.cumulative_expense, exp);
        }
        assert_eq!(rows[0].monthly_revenue, 25.0);
        assert_eq!(rows[2].cumulative_expense, 25.0);
    }

    #[test]
    fn test_depreciation_front_loaded_exactly_dep_months() {
        let mut dev = device();
        dev.dep_months = 2;
        let long_axis: Vec<_> = (1..=5)
            .map(|m| NaiveDate::from_ymd_opt(2025, m, 1).unwrap())
            .collect();
        let rows = aggregate(&dev, &[], &ExpenseMap::new(), &long_axis, None, None);
        let applied: Vec<_> = rows.iter().map(|r| r.depreciation).collect();
        assert_eq!(applied, vec![100.0, 100.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_service_filter_suppresses_expense_and_depreciation() {
        let records = vec![record("2025-01", "A", 50.0), record("2025-01", "B", 70.0)];
        let mut map = ExpenseMap::new();
        map.insert("4500-2025-01".to_string(), 20.0);

        let rows = aggregate(&device(), &records, &map, &axis(), None, Some("A"));

        // Only service A revenue counts; expense and depreciation are zeroed.
        assert_eq!(rows[0].monthly_revenue, 50.0);
        assert!(rows.iter().all(|r| r.monthly_expense == 0.0));
        assert!(rows.iter().all(|r| r.depreciation == 0.0));
        // Capex is still reported on every row.
        assert!(rows.iter().all(|r| r.capex == 1000.0));
    }

    #[test]
    fn test_other_devices_excluded() {
        let mut foreign = record("2025-01", "A", 500.0);
        foreign.ae_title = "MR99".to_string();
        let rows = aggregate(&device(), &[foreign], &ExpenseMap::new(), &axis(), None, None);
        assert!(rows.iter().all(|r| r.monthly_revenue == 0.0));
    }

    #[test]
    fn test_break_even_classification() {
        let records = vec![
            record("2025-01", "A", -50.0),
            record("2025-02", "A", 600.0),
            record("2025-03", "A", 600.0),
        ];
        let rows = aggregate(&device(), &records, &ExpenseMap::new(), &axis(), None, None);
        assert_eq!(rows[0].break_even, BreakEvenClass::Negative);
        assert_eq!(rows[1].break_even, BreakEvenClass::BelowCapex);
        assert_eq!(rows[2].break_even, BreakEvenClass::Reached);
        assert_eq!(break_even_row(&rows), Some(2));
    }

    #[test]
    fn test_break_even_never_reached() {
        let records = vec![record("2025-01", "A", 10.0)];
        let rows = aggregate(&device(), &records, &ExpenseMap::new(), &axis(), None, None);
        assert_eq!(break_even_row(&rows), None);
    }
}
