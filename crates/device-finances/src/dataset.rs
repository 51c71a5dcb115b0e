//! Device dataset assembly and the wire DTOs for the dashboard API
//!
//! `build_device_data` joins the cached SAP postings, PACS usage rows and
//! HIS tariff maps for one device into the response the dashboard consumes:
//! the expense map, the per-procedure revenue records and the shared date
//! axis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::DashboardConfig;
use crate::constants;
use crate::devices::Device;
use crate::expenses::{expense_key, ExpenseMap};
use crate::store::DataCache;
use crate::timeline;

/// One billed procedure event (aggregated per device, service and month)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRecord {
    pub ae_title: String,
    pub service_code: String,
    pub service_name: String,
    /// Year-month bucket, "YYYY-MM"
    pub year_month: String,
    #[serde(default)]
    pub order_qty: u64,
    /// Signed profit/loss for the bucket
    #[serde(rename = "revenuePL", default)]
    pub revenue_pl: f64,
}

/// Response body of GET /api/initial-data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDataResponse {
    pub bme_map: HashMap<String, Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body of GET /api/device-data/{ae_title}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDataResponse {
    pub sap_map: ExpenseMap,
    pub pacs_data_details: Vec<ProcedureRecord>,
    /// Shared date axis, ISO dates in ascending order
    pub all_unique_dates: Vec<String>,
    pub today_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Assemble the full dataset for one device, or None when the AE title is
/// not in the catalog (the caller maps that to a 404).
pub fn build_device_data(
    ae_title: &str,
    cache: &DataCache,
    today: NaiveDate,
    cfg: &DashboardConfig,
) -> Option<DeviceDataResponse> {
    let device = cache.catalog.get(ae_title)?;

    let mut all_dates: BTreeSet<NaiveDate> = BTreeSet::new();

    // SAP: postings for this device's order number, grouped by month.
    let mut sap_monthly: HashMap<String, f64> = HashMap::new();
    for posting in &cache.sap_rows {
        if posting.order_no != device.order_num || posting.amount == 0.0 {
            continue;
        }
        all_dates.insert(posting.posting_date);
        let ym = posting.posting_date.format(constants::YEAR_MONTH_FORMAT).to_string();
        *sap_monthly.entry(ym).or_insert(0.0) += posting.amount;
    }
    let sap_map: ExpenseMap = sap_monthly
        .into_iter()
        .map(|(ym, amount)| (expense_key(&device.order_num, &ym), amount))
        .collect();

    // PACS: usage rows priced against the HIS tariff, cost fallback when the
    // cost table has no usable entry.
    let mut records = Vec::new();
    for usage in &cache.pacs_rows {
        if usage.ae_title.trim() != device.ae_title {
            continue;
        }
        if usage.order_qty <= 0 || usage.year_month.len() < 7 {
            continue;
        }
        let year_month = usage.year_month[..7].to_string();
        let code = usage.service_code.trim().to_string();

        let price = cache.price_map.get(&code).copied().unwrap_or(0.0);
        let cost = match cache.cost_map.get(&code) {
            Some(&c) if c != 0.0 => c,
            _ => price * cfg.cost_fallback_ratio,
        };
        let name = cache
            .name_map
            .get(&code)
            .cloned()
            .unwrap_or_else(|| code.clone());

        let qty = usage.order_qty as u64;
        let revenue_pl = (price - cost) * qty as f64;

        if let Ok(first_of_month) =
            NaiveDate::parse_from_str(&format!("{}-01", year_month), constants::DATE_FORMAT_API)
        {
            all_dates.insert(first_of_month);
        } else {
            continue;
        }

        records.push(ProcedureRecord {
            ae_title: device.ae_title.clone(),
            service_code: code,
            service_name: name,
            year_month,
            order_qty: qty,
            revenue_pl,
        });
    }

    if let Some(install) = device.install_date {
        all_dates.insert(install);
    }

    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();
    let axis = timeline::generate_date_axis(&dates, today, cfg.timeline_future_months);

    Some(DeviceDataResponse {
        sap_map,
        pacs_data_details: records,
        all_unique_dates: axis
            .iter()
            .map(|d| d.format(constants::DATE_FORMAT_API).to_string())
            .collect(),
        today_str: Some(today.format(constants::DATE_FORMAT_API).to_string()),
        device_info: Some(device.clone()),
        error: None,
    })
}
