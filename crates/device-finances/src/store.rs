//! Database loading for the dashboard dataset
//!
//! The main database holds the BME asset catalog, SAP postings, PACS usage
//! and the cost table; an optional secondary (HIS) database holds the tariff
//! prices and service names. Everything is loaded once at startup into a
//! `DataCache`; the BME catalog is required, the HIS and cost maps degrade
//! to empty on failure so the dashboard still runs (with zero revenue).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, TableNames};
use crate::devices::{DeviceCatalog, DeviceRow};

/// One SAP posting, already reduced to what the dashboard needs
#[derive(Debug, Clone)]
pub struct SapPosting {
    pub order_no: String,
    pub posting_date: NaiveDate,
    pub amount: f64,
}

/// One PACS usage bucket (device, service, month) with its exam count
#[derive(Debug, Clone)]
pub struct PacsUsage {
    pub ae_title: String,
    pub service_code: String,
    pub year_month: String,
    pub order_qty: i64,
}

/// Everything the API serves, loaded once per process
#[derive(Debug, Clone, Default)]
pub struct DataCache {
    pub catalog: DeviceCatalog,
    /// HIS tariff price per service code
    pub price_map: HashMap<String, f64>,
    /// HIS display name per service code
    pub name_map: HashMap<String, String>,
    /// Unit cost per service code
    pub cost_map: HashMap<String, f64>,
    pub sap_rows: Vec<SapPosting>,
    pub pacs_rows: Vec<PacsUsage>,
}

/// Row type for the BME catalog query
#[derive(FromRow)]
struct BmeRow {
    ae_title: Option<String>,
    purchase_price: Option<f64>,
    depreciation_years: Option<f64>,
    order_no: Option<String>,
    asset_name: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    receive_date: Option<NaiveDate>,
}

/// Row type for the SAP postings query
#[derive(FromRow)]
struct SapRow {
    order_no: String,
    posting_date: NaiveDate,
    amount: f64,
}

/// Row type for the PACS usage query
#[derive(FromRow)]
struct PacsRow {
    ae_title: String,
    service_code: String,
    year_month: String,
    order_qty: i64,
}

/// Row type for the HIS tariff queries
#[derive(FromRow)]
struct TariffRow {
    service_code: String,
    value: Option<f64>,
}

#[derive(FromRow)]
struct NameRow {
    service_code: String,
    service_name: Option<String>,
}

/// Connection handles for the source databases
pub struct DataStore {
    main: PgPool,
    his: Option<PgPool>,
    tables: TableNames,
}

impl DataStore {
    /// Connect to the main database (required) and the HIS database
    /// (optional; a failed connection only logs a warning).
    pub async fn connect(db: &DatabaseConfig, tables: TableNames) -> Result<Self> {
        let main = PgPool::connect(&db.main_url)
            .await
            .context("Failed to connect to main database")?;

        let his = match &db.his_url {
            Some(url) => match PgPool::connect(url).await {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!(error = %e, "HIS database unreachable, tariff maps will be empty");
                    None
                }
            },
            None => None,
        };

        Ok(Self { main, his, tables })
    }

    /// Load every table into memory. The BME catalog is required; HIS and
    /// cost lookups fall back to empty maps with a warning.
    pub async fn load_all(&self) -> Result<DataCache> {
        info!("loading lookup maps and datasets from databases");

        let catalog = self.load_catalog().await?;
        info!(devices = catalog.len(), "BME catalog loaded");

        let (price_map, name_map) = match self.load_tariffs().await {
            Ok(maps) => maps,
            Err(e) => {
                warn!(error = %e, "failed to load HIS tariff tables, revenue will be zero");
                (HashMap::new(), HashMap::new())
            }
        };

        let cost_map = match self.load_costs().await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "failed to load cost table, cost fallback ratio applies");
                HashMap::new()
            }
        };

        let sap_rows = self.load_sap().await?;
        let pacs_rows = self.load_pacs().await?;
        info!(
            sap_rows = sap_rows.len(),
            pacs_rows = pacs_rows.len(),
            "datasets cached"
        );

        Ok(DataCache {
            catalog,
            price_map,
            name_map,
            cost_map,
            sap_rows,
            pacs_rows,
        })
    }

    async fn load_catalog(&self) -> Result<DeviceCatalog> {
        let sql = format!(
            r#"
            SELECT
                "ae_title"                     AS ae_title,
                "purchase_price"::float8       AS purchase_price,
                "depreciation_years"::float8   AS depreciation_years,
                "order_no"                     AS order_no,
                "asset_name"                   AS asset_name,
                "brand"                        AS brand,
                "model"                        AS model,
                "receive_date"::date           AS receive_date
            FROM "{}"
            "#,
            self.tables.bme
        );

        let rows: Vec<BmeRow> = sqlx::query_as(&sql)
            .fetch_all(&self.main)
            .await
            .context("Failed to load BME catalog")?;

        Ok(DeviceCatalog::from_rows(
            rows.into_iter()
                .map(|r| DeviceRow {
                    ae_title: r.ae_title,
                    purchase_price: r.purchase_price,
                    depreciation_years: r.depreciation_years,
                    order_no: r.order_no,
                    asset_name: r.asset_name,
                    brand: r.brand,
                    model: r.model,
                    receive_date: r.receive_date,
                })
                .collect(),
        ))
    }

    async fn load_tariffs(&self) -> Result<(HashMap<String, f64>, HashMap<String, String>)> {
        let Some(his) = &self.his else {
            anyhow::bail!("no HIS database configured");
        };

        let price_sql = format!(
            r#"
            SELECT "Code" AS service_code, "DefaultPrice"::float8 AS value
            FROM "{}"
            WHERE "Code" IS NOT NULL
            "#,
            self.tables.his
        );
        let prices: Vec<TariffRow> = sqlx::query_as(&price_sql)
            .fetch_all(his)
            .await
            .context("Failed to load HIS tariff prices")?;

        let name_sql = format!(
            r#"
            SELECT "Code" AS service_code, "EnglishName" AS service_name
            FROM "{}"
            WHERE "Code" IS NOT NULL
            "#,
            self.tables.his
        );
        let names: Vec<NameRow> = sqlx::query_as(&name_sql)
            .fetch_all(his)
            .await
            .context("Failed to load HIS service names")?;

        let price_map = prices
            .into_iter()
            .map(|r| (r.service_code.trim().to_string(), r.value.unwrap_or(0.0)))
            .collect();
        let name_map = names
            .into_iter()
            .filter_map(|r| {
                r.service_name
                    .map(|n| (r.service_code.trim().to_string(), n))
            })
            .collect();

        Ok((price_map, name_map))
    }

    async fn load_costs(&self) -> Result<HashMap<String, f64>> {
        let sql = format!(
            r#"
            SELECT "Code" AS service_code, "GrandTotalCost"::float8 AS value
            FROM "{}"
            WHERE "Code" IS NOT NULL
            "#,
            self.tables.cost
        );
        let rows: Vec<TariffRow> = sqlx::query_as(&sql)
            .fetch_all(&self.main)
            .await
            .context("Failed to load cost table")?;

        Ok(rows
            .into_iter()
            .map(|r| (r.service_code.trim().to_string(), r.value.unwrap_or(0.0)))
            .collect())
    }

    async fn load_sap(&self) -> Result<Vec<SapPosting>> {
        let sql = format!(
            r#"
            SELECT
                "Order"                  AS order_no,
                "Posting_Date"::date     AS posting_date,
                "Valin_repcur"::float8   AS amount
            FROM "{}"
            WHERE "Order" IS NOT NULL
              AND "Posting_Date" IS NOT NULL
              AND "Valin_repcur" IS NOT NULL
            "#,
            self.tables.sap
        );
        let rows: Vec<SapRow> = sqlx::query_as(&sql)
            .fetch_all(&self.main)
            .await
            .context("Failed to load SAP postings")?;

        Ok(rows
            .into_iter()
            .map(|r| SapPosting {
                order_no: r.order_no.trim().to_string(),
                posting_date: r.posting_date,
                amount: r.amount,
            })
            .collect())
    }

    async fn load_pacs(&self) -> Result<Vec<PacsUsage>> {
        // Aggregated in SQL: one row per (device, service, month).
        let sql = format!(
            r#"
            SELECT
                COALESCE("ae_title", '')          AS ae_title,
                COALESCE("service_code", '')      AS service_code,
                to_char("exam_date", 'YYYY-MM')   AS year_month,
                COUNT(*)::int8                    AS order_qty
            FROM "{}"
            WHERE "exam_date" IS NOT NULL
            GROUP BY 1, 2, 3
            "#,
            self.tables.pacs
        );
        let rows: Vec<PacsRow> = sqlx::query_as(&sql)
            .fetch_all(&self.main)
            .await
            .context("Failed to load PACS usage")?;

        Ok(rows
            .into_iter()
            .map(|r| PacsUsage {
                ae_title: r.ae_title.trim().to_string(),
                service_code: r.service_code.trim().to_string(),
                year_month: r.year_month,
                order_qty: r.order_qty,
            })
            .collect())
    }
}
