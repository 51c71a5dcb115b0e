//! Device catalog: static attributes of each BME device keyed by AE title
//!
//! Rows come from the BME asset table and are validated on load; a device
//! without a usable AE title, purchase price or depreciation schedule cannot
//! be charted and is dropped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::constants;

/// One medical-equipment device, immutable for the session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Unique device identifier (DICOM AE title)
    pub ae_title: String,
    /// Purchase price, the break-even target
    pub cap_ex: f64,
    /// Straight-line depreciation per month (capex / dep_months)
    pub monthly_dep: f64,
    /// Depreciation duration in months
    pub dep_months: u32,
    /// SAP order number, keys the expense lookups
    pub order_num: String,
    pub bme_name: String,
    pub brand: String,
    pub model: String,
    pub install_date: Option<NaiveDate>,
}

/// Raw catalog row before validation
#[derive(Debug, Clone)]
pub struct DeviceRow {
    pub ae_title: Option<String>,
    pub purchase_price: Option<f64>,
    pub depreciation_years: Option<f64>,
    pub order_no: Option<String>,
    pub asset_name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub receive_date: Option<NaiveDate>,
}

/// Validated device lookup table
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    devices: HashMap<String, Device>,
}

impl DeviceCatalog {
    /// Build the catalog from raw BME rows, dropping rows that cannot
    /// be charted: blank or textual-null AE titles, non-positive capex,
    /// non-positive depreciation duration.
    pub fn from_rows(rows: Vec<DeviceRow>) -> Self {
        let mut devices = HashMap::new();

        for row in rows {
            let ae_title = match row.ae_title.as_deref().map(str::trim) {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => continue,
            };
            if constants::INVALID_AE_TITLES.contains(&ae_title.to_lowercase().as_str()) {
                debug!(ae_title, "skipping catalog row with placeholder AE title");
                continue;
            }

            let cap_ex = match row.purchase_price {
                Some(p) if p > 0.0 => p,
                _ => {
                    debug!(ae_title, "skipping catalog row without positive capex");
                    continue;
                }
            };
            let dep_years = match row.depreciation_years {
                Some(y) if y > 0.0 => y,
                _ => {
                    debug!(ae_title, "skipping catalog row without depreciation years");
                    continue;
                }
            };

            let dep_months = (dep_years * 12.0) as u32;
            let monthly_dep = cap_ex / dep_months as f64;

            devices.insert(
                ae_title.clone(),
                Device {
                    ae_title,
                    cap_ex,
                    monthly_dep,
                    dep_months,
                    order_num: row.order_no.as_deref().map(str::trim).unwrap_or("").to_string(),
                    bme_name: row.asset_name.as_deref().map(str::trim).unwrap_or("").to_string(),
                    brand: row.brand.as_deref().map(str::trim).unwrap_or("").to_string(),
                    model: row.model.as_deref().map(str::trim).unwrap_or("").to_string(),
                    install_date: row.receive_date,
                },
            );
        }

        Self { devices }
    }

    /// Wrap an already-validated device map (e.g. a fetched initial-data
    /// response).
    pub fn from_devices(devices: HashMap<String, Device>) -> Self {
        Self { devices }
    }

    pub fn get(&self, ae_title: &str) -> Option<&Device> {
        self.devices.get(ae_title)
    }

    pub fn devices(&self) -> &HashMap<String, Device> {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Cascading dropdown hierarchy: asset name -> "brand | model" -> AE titles.
    /// Every level is sorted so the UI renders deterministically.
    pub fn hierarchy(&self) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
        let mut tree: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();

        for device in self.devices.values() {
            let name = if device.bme_name.is_empty() {
                "Unknown".to_string()
            } else {
                device.bme_name.clone()
            };
            let brand = if device.brand.is_empty() { "N/A" } else { &device.brand };
            let model = if device.model.is_empty() { "N/A" } else { &device.model };
            let brand_model = format!("{} | {}", brand, model);

            tree.entry(name)
                .or_default()
                .entry(brand_model)
                .or_default()
                .push(device.ae_title.clone());
        }

        for brands in tree.values_mut() {
            for titles in brands.values_mut() {
                titles.sort();
            }
        }

        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ae: &str, price: Option<f64>, years: Option<f64>) -> DeviceRow {
        DeviceRow {
            ae_title: Some(ae.to_string()),
            purchase_price: price,
            depreciation_years: years,
            order_no: Some("4500012345".to_string()),
            asset_name: Some("CT Scanner".to_string()),
            brand: Some("Acme".to_string()),
            model: Some("X1".to_string()),
            receive_date: None,
        }
    }

    #[test]
    fn test_valid_row_computes_depreciation() {
        let catalog = DeviceCatalog::from_rows(vec![row("CT01", Some(1200.0), Some(5.0))]);
        let device = catalog.get("CT01").unwrap();
        assert_eq!(device.dep_months, 60);
        assert!((device.monthly_dep - 20.0).abs() < 1e-9);
        assert_eq!(device.cap_ex, 1200.0);
    }

    #[test]
    fn test_invalid_rows_dropped() {
        let catalog = DeviceCatalog::from_rows(vec![
            row("", Some(1000.0), Some(5.0)),
            row("NaN", Some(1000.0), Some(5.0)),
            row("null", Some(1000.0), Some(5.0)),
            row("CT02", Some(0.0), Some(5.0)),
            row("CT03", None, Some(5.0)),
            row("CT04", Some(1000.0), Some(0.0)),
            row("CT05", Some(1000.0), None),
        ]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_ae_title_trimmed() {
        let catalog = DeviceCatalog::from_rows(vec![row("  CT06  ", Some(500.0), Some(2.0))]);
        assert!(catalog.get("CT06").is_some());
    }

    #[test]
    fn test_hierarchy_groups_and_sorts() {
        let mut a = row("CT_B", Some(1000.0), Some(5.0));
        a.asset_name = Some("CT".to_string());
        let mut b = row("CT_A", Some(1000.0), Some(5.0));
        b.asset_name = Some("CT".to_string());
        let mut c = row("MR_1", Some(2000.0), Some(7.0));
        c.asset_name = Some("MRI".to_string());
        c.brand = None;
        c.model = None;

        let catalog = DeviceCatalog::from_rows(vec![a, b, c]);
        let tree = catalog.hierarchy();

        let ct = &tree["CT"]["Acme | X1"];
        assert_eq!(ct, &["CT_A", "CT_B"]);
        assert!(tree["MRI"].contains_key("N/A | N/A"));
    }
}
