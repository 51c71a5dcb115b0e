//! Financial tracking for hospital medical-equipment (BME) devices
//!
//! Turns per-procedure revenue records (PACS), posted expenses (SAP) and the
//! device catalog (capex, depreciation schedule) into date-aligned monthly and
//! cumulative series, with a cross-filter state machine driving the dashboard
//! views (monthly chart, break-even chart, per-procedure breakdown).

pub mod aggregate;
pub mod client;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod dataset;
pub mod devices;
pub mod expenses;
pub mod reports;
pub mod state;
pub mod store;
pub mod summary;
pub mod timeline;

pub use aggregate::{aggregate, break_even_row, AggregatedRow, BreakEvenClass};
pub use dashboard::{Dashboard, DeviceData};
pub use dataset::{build_device_data, DeviceDataResponse, InitialDataResponse, ProcedureRecord};
pub use devices::{Device, DeviceCatalog};
pub use expenses::ExpenseMap;
pub use state::{Action, Effect, FilterState};
pub use summary::{paginate, summarize, total_pages, ServiceSummary};
