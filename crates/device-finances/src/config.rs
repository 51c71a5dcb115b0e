//! Configuration for the device financial tracker

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::constants;

/// Configuration loaded from config.toml
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tables: TableNames,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// HTTP server settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:5000"
    pub addr: String,
}

/// Database connections
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    /// Main database (BME catalog, SAP postings, PACS usage)
    pub main_url: String,
    /// HIS database (tariff prices, service names, unit costs).
    /// Optional: when absent or unreachable the dashboard runs with
    /// empty tariff maps and zero revenue.
    #[serde(default)]
    pub his_url: Option<String>,
}

/// Physical table names in the two databases
#[derive(Debug, Clone, Deserialize)]
pub struct TableNames {
    #[serde(default = "default_bme_table")]
    pub bme: String,
    #[serde(default = "default_sap_table")]
    pub sap: String,
    #[serde(default = "default_pacs_table")]
    pub pacs: String,
    #[serde(default = "default_his_table")]
    pub his: String,
    #[serde(default = "default_cost_table")]
    pub cost: String,
}

fn default_bme_table() -> String {
    "UTILIZE_BME".to_string()
}
fn default_sap_table() -> String {
    "UTILIZE_SAP".to_string()
}
fn default_pacs_table() -> String {
    "UTILIZE_PACS2".to_string()
}
fn default_his_table() -> String {
    "HIS_MASTER_TREATMENT_CODE".to_string()
}
fn default_cost_table() -> String {
    "UTILIZE_COST_XRAY".to_string()
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            bme: default_bme_table(),
            sap: default_sap_table(),
            pacs: default_pacs_table(),
            his: default_his_table(),
            cost: default_cost_table(),
        }
    }
}

/// Dashboard tunables
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Months past today the date axis extends
    #[serde(default = "default_future_months")]
    pub timeline_future_months: u32,
    /// Unit-cost fallback as a fraction of the tariff price
    #[serde(default = "default_cost_fallback_ratio")]
    pub cost_fallback_ratio: f64,
    /// Rows per page in the service breakdown
    #[serde(default = "default_page_size")]
    pub service_page_size: usize,
    /// Timeout for API fetches, seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Initial chart window width in years, anchored at the install date
    #[serde(default = "default_window_years")]
    pub initial_window_years: u32,
}

fn default_future_months() -> u32 {
    constants::TIMELINE_FUTURE_MONTHS
}
fn default_cost_fallback_ratio() -> f64 {
    constants::COST_FALLBACK_RATIO
}
fn default_page_size() -> usize {
    constants::SERVICE_PAGE_SIZE
}
fn default_fetch_timeout() -> u64 {
    constants::FETCH_TIMEOUT_SECS
}
fn default_window_years() -> u32 {
    constants::INITIAL_WINDOW_YEARS
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            timeline_future_months: default_future_months(),
            cost_fallback_ratio: default_cost_fallback_ratio(),
            service_page_size: default_page_size(),
            fetch_timeout_secs: default_fetch_timeout(),
            initial_window_years: default_window_years(),
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Missing required fields (server.addr, database.main_url)\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\n\
             See config.toml.example for the expected format."
        })
    }
}
