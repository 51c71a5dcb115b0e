//! BME Device Financial Dashboard CLI
//!
//! Pulls device datasets from a running utilize-api instance and produces
//! the same aggregation the dashboard shows: date-aligned revenue/expense
//! series, the service breakdown and CSV reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use device_finances::client::DashboardClient;
use device_finances::config::{DashboardConfig, FileConfig};
use device_finances::dashboard::{Dashboard, DeviceData};
use device_finances::devices::DeviceCatalog;
use device_finances::reports;
use device_finances::state::Action;

#[derive(Parser, Debug)]
#[command(name = "device-finances")]
#[command(about = "Financial reporting for BME imaging devices")]
struct Args {
    /// Base URL of the dashboard API
    #[arg(long, default_value = "http://localhost:8000", global = true)]
    api_url: String,

    /// Config file with the [dashboard] tunables (optional)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Output directory for generated CSV reports
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// List the device catalog grouped by equipment name
    Devices,

    /// Generate reports for one device
    Report {
        /// AE title of the device
        ae_title: String,

        /// Filter the service breakdown to a year (e.g., 2025)
        #[arg(long)]
        year: Option<String>,

        /// Filter the service breakdown to a month (e.g., 2025-01)
        #[arg(long)]
        month: Option<String>,

        /// Restrict the series to one service code
        #[arg(long)]
        service: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // The config file belongs to the server; the CLI only borrows its
    // [dashboard] tunables and falls back to defaults when it is absent.
    let dashboard_cfg = if args.config.exists() {
        FileConfig::load(&args.config)?.dashboard
    } else {
        DashboardConfig::default()
    };

    let client = DashboardClient::from_config(&args.api_url, &dashboard_cfg)?;

    match args.command.clone() {
        Command::Devices => list_devices(&client).await,
        Command::Report {
            ae_title,
            year,
            month,
            service,
        } => generate_report(&args, &client, &dashboard_cfg, &ae_title, year, month, service).await,
    }
}

async fn fetch_catalog(client: &DashboardClient) -> Result<DeviceCatalog> {
    let initial = client.fetch_initial_data().await?;
    Ok(DeviceCatalog::from_devices(initial.bme_map))
}

/// Print the catalog grouped by equipment name, then brand/model.
async fn list_devices(client: &DashboardClient) -> Result<()> {
    let catalog = fetch_catalog(client).await?;

    if catalog.is_empty() {
        println!("No devices in the catalog.");
        return Ok(());
    }

    for (name, models) in catalog.hierarchy() {
        println!("{}", name);
        for (model, ae_titles) in models {
            println!("  {}", model);
            for ae_title in ae_titles {
                println!("    {}", ae_title);
            }
        }
    }
    println!("\n{} device(s)", catalog.len());

    Ok(())
}

async fn generate_report(
    args: &Args,
    client: &DashboardClient,
    dashboard_cfg: &DashboardConfig,
    ae_title: &str,
    year: Option<String>,
    month: Option<String>,
    service: Option<String>,
) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;

    let catalog = fetch_catalog(client).await?;
    let mut dashboard = Dashboard::with_config(catalog, dashboard_cfg);

    let seq = dashboard.begin_fetch(ae_title);
    let response = client.fetch_device_data(ae_title).await?;
    dashboard.apply_response(seq, DeviceData::from_response(response));

    if let Some(year) = year {
        dashboard.dispatch(Action::SetYear(Some(year)));
    }
    if let Some(month) = month {
        dashboard.dispatch(Action::ToggleMonth(month));
    }
    if let Some(service) = service {
        dashboard.dispatch(Action::ToggleService(service));
    }

    let device = dashboard
        .catalog()
        .get(ae_title)
        .ok_or_else(|| anyhow::anyhow!("Device '{}' not found in the catalog", ae_title))?
        .clone();

    let rows = dashboard.chart_rows();
    let summaries = dashboard.summaries();

    let report_data = reports::ReportData {
        device: &device,
        rows: &rows,
        summaries: &summaries,
    };
    reports::generate_all_reports(&args.output_dir, &report_data)?;
    reports::print_summary(&report_data);

    println!("\nDone! Reports written to: {}", args.output_dir.display());

    Ok(())
}
