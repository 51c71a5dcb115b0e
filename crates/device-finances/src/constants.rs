//! Shared constants for the device-finances tools

/// Date format used on the wire and in reports
pub const DATE_FORMAT_API: &str = "%Y-%m-%d";

/// Year-month bucket format ("2025-01")
pub const YEAR_MONTH_FORMAT: &str = "%Y-%m";

/// Service code used when a PACS row carries no code
pub const SENTINEL_SERVICE_CODE: &str = "-";

/// Fraction of the tariff price assumed as unit cost when the cost
/// table has no (or a zero) entry for a service code
pub const COST_FALLBACK_RATIO: f64 = 0.70;

/// How many months past today the date axis extends
pub const TIMELINE_FUTURE_MONTHS: u32 = 3;

/// Rows per page in the per-procedure breakdown
pub const SERVICE_PAGE_SIZE: usize = 5;

/// Timeout for dashboard API fetches
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Initial chart window width, anchored at the install date
pub const INITIAL_WINDOW_YEARS: u32 = 3;

/// AE title values that are textual nulls, not real identifiers
pub const INVALID_AE_TITLES: [&str; 4] = ["none", "nan", "null", "na"];

/// Report filenames
pub const SERIES_REPORT_FILENAME: &str = "device_series.csv";
pub const SUMMARY_REPORT_FILENAME: &str = "service_summary.csv";
