//! Dashboard coordinator
//!
//! Owns the catalog, the filter state and the cached dataset of the selected
//! device, and derives everything the views need (chart rows, the service
//! breakdown, the current page). Dataset fetches are tagged with a sequence
//! number; only the response matching the newest request is accepted, so a
//! slow response for a previously selected device can never overwrite the
//! current one.

use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::{self, AggregatedRow};
use crate::config::DashboardConfig;
use crate::constants;
use crate::dataset::{DeviceDataResponse, ProcedureRecord};
use crate::devices::DeviceCatalog;
use crate::expenses::ExpenseMap;
use crate::state::{Action, Effect, FilterState};
use crate::summary::{self, ServiceSummary};
use crate::timeline;

/// Parsed dataset of the selected device
#[derive(Debug, Clone, Default)]
pub struct DeviceData {
    pub sap_map: ExpenseMap,
    pub records: Vec<ProcedureRecord>,
    pub date_axis: Vec<NaiveDate>,
    pub today: Option<NaiveDate>,
}

impl DeviceData {
    /// Parse the wire response, dropping axis entries that fail to parse.
    pub fn from_response(response: DeviceDataResponse) -> Self {
        let date_axis = response
            .all_unique_dates
            .iter()
            .filter_map(|s| NaiveDate::parse_from_str(s, constants::DATE_FORMAT_API).ok())
            .collect();
        let today = response
            .today_str
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, constants::DATE_FORMAT_API).ok());
        Self {
            sap_map: response.sap_map,
            records: response.pacs_data_details,
            date_axis,
            today,
        }
    }
}

pub struct Dashboard {
    catalog: DeviceCatalog,
    pub filter: FilterState,
    data: Option<DeviceData>,
    request_seq: u64,
    page_size: usize,
    window_years: u32,
}

impl Dashboard {
    pub fn new(catalog: DeviceCatalog) -> Self {
        Self::with_config(catalog, &DashboardConfig::default())
    }

    /// Build a dashboard honoring the configured tunables (page size,
    /// initial window width).
    pub fn with_config(catalog: DeviceCatalog, cfg: &DashboardConfig) -> Self {
        Self {
            catalog,
            filter: FilterState::default(),
            data: None,
            request_seq: 0,
            page_size: cfg.service_page_size,
            window_years: cfg.initial_window_years,
        }
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    /// Record a device selection and hand out the sequence number the
    /// eventual response must carry. Clears the cached dataset.
    pub fn begin_fetch(&mut self, ae_title: &str) -> u64 {
        self.filter
            .apply(Action::SelectDevice(Some(ae_title.to_string())), 0);
        self.data = None;
        self.request_seq += 1;
        self.request_seq
    }

    /// Accept a dataset if it answers the newest request. Stale responses
    /// are discarded and false is returned.
    pub fn apply_response(&mut self, seq: u64, data: DeviceData) -> bool {
        if seq != self.request_seq {
            debug!(seq, current = self.request_seq, "discarding stale device response");
            return false;
        }
        self.data = Some(data);
        true
    }

    /// Apply a user action, bounding pagination by the current summary.
    pub fn dispatch(&mut self, action: Action) -> Effect {
        let pages = summary::total_pages(self.summaries().len(), self.page_size);
        let effect = self.filter.apply(action, pages);
        let total = self.summaries().len();
        self.filter.snap_page(total, self.page_size);
        effect
    }

    /// Date-aligned chart rows under the active service filter.
    pub fn chart_rows(&self) -> Vec<AggregatedRow> {
        let (Some(ae_title), Some(data)) = (self.filter.ae_title.as_deref(), &self.data) else {
            return Vec::new();
        };
        let Some(device) = self.catalog.get(ae_title) else {
            return Vec::new();
        };
        aggregate::aggregate(
            device,
            &data.records,
            &data.sap_map,
            &data.date_axis,
            data.today,
            self.filter.service.as_deref(),
        )
    }

    /// Full service breakdown under the month and year filters.
    pub fn summaries(&self) -> Vec<ServiceSummary> {
        let (Some(ae_title), Some(data)) = (self.filter.ae_title.as_deref(), &self.data) else {
            return Vec::new();
        };
        summary::summarize(
            &data.records,
            ae_title,
            self.filter.month.as_deref(),
            self.filter.year.as_deref(),
            self.filter.service.as_deref(),
        )
    }

    /// The currently visible page of the breakdown.
    pub fn service_page(&self) -> Vec<ServiceSummary> {
        let rows = self.summaries();
        summary::paginate(&rows, self.filter.page, self.page_size).to_vec()
    }

    /// Initial chart viewing window for the selected device, anchored at
    /// its install date and clamped to the date axis.
    pub fn initial_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (Some(ae_title), Some(data)) = (self.filter.ae_title.as_deref(), &self.data) else {
            return None;
        };
        let device = self.catalog.get(ae_title)?;
        timeline::initial_date_window(device.install_date, &data.date_axis, self.window_years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceRow;
    use std::collections::HashMap;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn catalog() -> DeviceCatalog {
        DeviceCatalog::from_rows(vec![DeviceRow {
            ae_title: Some("CT01".to_string()),
            purchase_price: Some(1000.0),
            depreciation_years: Some(1.0),
            order_no: Some("4500".to_string()),
            asset_name: Some("CT Scanner".to_string()),
            brand: Some("Acme".to_string()),
            model: Some("X1".to_string()),
            receive_date: None,
        }])
    }

    fn record(ym: &str, code: &str, qty: u64, revenue: f64) -> ProcedureRecord {
        ProcedureRecord {
            ae_title: "CT01".to_string(),
            service_code: code.to_string(),
            service_name: code.to_string(),
            year_month: ym.to_string(),
            order_qty: qty,
            revenue_pl: revenue,
        }
    }

    fn data() -> DeviceData {
        let mut sap_map = HashMap::new();
        sap_map.insert("4500-2025-01".to_string(), 20.0);
        DeviceData {
            sap_map,
            records: vec![
                record("2025-01", "A", 2, 100.0),
                record("2025-01", "B", 1, 40.0),
                record("2025-02", "A", 1, 60.0),
            ],
            date_axis: vec![d("2025-01-01"), d("2025-02-01")],
            today: Some(d("2025-02-15")),
        }
    }

    fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::new(catalog());
        let seq = dashboard.begin_fetch("CT01");
        assert!(dashboard.apply_response(seq, data()));
        dashboard
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut dashboard = Dashboard::new(catalog());
        let first = dashboard.begin_fetch("CT01");
        let second = dashboard.begin_fetch("CT01");
        assert!(!dashboard.apply_response(first, data()));
        assert!(dashboard.chart_rows().is_empty());
        assert!(dashboard.apply_response(second, data()));
        assert_eq!(dashboard.chart_rows().len(), 2);
    }

    #[test]
    fn test_chart_rows_follow_service_filter() {
        let mut dashboard = loaded();
        assert_eq!(dashboard.chart_rows()[0].monthly_revenue, 140.0);
        assert_eq!(dashboard.chart_rows()[0].monthly_expense, 20.0);

        dashboard.dispatch(Action::ToggleService("A".to_string()));
        let rows = dashboard.chart_rows();
        assert_eq!(rows[0].monthly_revenue, 100.0);
        assert_eq!(rows[0].monthly_expense, 0.0);
    }

    #[test]
    fn test_month_filter_restricts_summary_not_chart() {
        let mut dashboard = loaded();
        dashboard.dispatch(Action::ToggleMonth("2025-01".to_string()));
        let rows = dashboard.summaries();
        assert_eq!(rows.len(), 2);
        assert_eq!(dashboard.chart_rows().len(), 2);
    }

    #[test]
    fn test_device_switch_resets_view() {
        let mut dashboard = loaded();
        dashboard.dispatch(Action::ToggleService("A".to_string()));
        dashboard.begin_fetch("CT01");
        assert!(dashboard.filter.service.is_none());
        assert!(dashboard.chart_rows().is_empty());
    }

    #[test]
    fn test_configured_page_size_applies() {
        let cfg = DashboardConfig {
            service_page_size: 1,
            ..Default::default()
        };
        let mut dashboard = Dashboard::with_config(catalog(), &cfg);
        let seq = dashboard.begin_fetch("CT01");
        assert!(dashboard.apply_response(seq, data()));

        // Two services split across two one-row pages instead of one page.
        assert_eq!(dashboard.service_page().len(), 1);
        assert_eq!(dashboard.dispatch(Action::ChangePage(1)), Effect::Redraw);
        assert_eq!(dashboard.filter.page, 1);
        assert_eq!(dashboard.service_page().len(), 1);
    }

    #[test]
    fn test_configured_window_years_applies() {
        let catalog = DeviceCatalog::from_rows(vec![DeviceRow {
            ae_title: Some("CT01".to_string()),
            purchase_price: Some(1000.0),
            depreciation_years: Some(1.0),
            order_no: Some("4500".to_string()),
            asset_name: Some("CT Scanner".to_string()),
            brand: Some("Acme".to_string()),
            model: Some("X1".to_string()),
            receive_date: Some(d("2025-01-10")),
        }]);
        let cfg = DashboardConfig {
            initial_window_years: 0,
            ..Default::default()
        };
        let mut dashboard = Dashboard::with_config(catalog, &cfg);
        let seq = dashboard.begin_fetch("CT01");
        assert!(dashboard.apply_response(seq, data()));

        // A zero-year window collapses onto the install date instead of
        // extending the default three years.
        assert_eq!(
            dashboard.initial_window(),
            Some((d("2025-01-10"), d("2025-01-10")))
        );
    }

    #[test]
    fn test_initial_window_spans_axis_without_install_date() {
        let dashboard = loaded();
        // The fixture device has no install date: the window is the axis.
        assert_eq!(
            dashboard.initial_window(),
            Some((d("2025-01-01"), d("2025-02-01")))
        );
    }

    #[test]
    fn test_service_page_bounds() {
        let mut dashboard = loaded();
        // Only two services: a single page, next page is a no-op.
        assert_eq!(dashboard.service_page().len(), 2);
        assert_eq!(dashboard.dispatch(Action::ChangePage(1)), Effect::None);
        assert_eq!(dashboard.filter.page, 0);
    }
}
