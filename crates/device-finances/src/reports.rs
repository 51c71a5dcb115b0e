//! Report generation (CSV outputs and console summary)

use anyhow::Result;
use csv::Writer;
use std::path::Path;

use crate::aggregate::{self, AggregatedRow, BreakEvenClass};
use crate::constants;
use crate::devices::Device;
use crate::summary::ServiceSummary;

/// Bundled report data to reduce function argument counts
pub struct ReportData<'a> {
    pub device: &'a Device,
    pub rows: &'a [AggregatedRow],
    pub summaries: &'a [ServiceSummary],
}

/// Generate all CSV reports
pub fn generate_all_reports(output_dir: &Path, data: &ReportData) -> Result<()> {
    generate_series_report(output_dir, data.rows)?;
    generate_summary_report(output_dir, data.summaries)?;
    Ok(())
}

/// Generate device_series.csv (one row per date-axis entry)
fn generate_series_report(output_dir: &Path, rows: &[AggregatedRow]) -> Result<()> {
    let path = output_dir.join(constants::SERIES_REPORT_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Date",
        "Monthly_Revenue",
        "Cumulative_Revenue",
        "Monthly_Expense",
        "Cumulative_Expense",
        "CapEx",
        "Depreciation",
        "Is_Future",
        "Break_Even",
    ])?;

    for row in rows {
        let class = match row.break_even {
            BreakEvenClass::Negative => "negative",
            BreakEvenClass::BelowCapex => "below_capex",
            BreakEvenClass::Reached => "reached",
        };
        wtr.write_record([
            &row.date.format(constants::DATE_FORMAT_API).to_string(),
            &format!("{:.2}", row.monthly_revenue),
            &format!("{:.2}", row.cumulative_revenue),
            &format!("{:.2}", row.monthly_expense),
            &format!("{:.2}", row.cumulative_expense),
            &format!("{:.2}", row.capex),
            &format!("{:.2}", row.depreciation),
            &String::from(if row.is_future { "yes" } else { "no" }),
            &String::from(class),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Generate service_summary.csv (per-procedure breakdown, revenue desc)
fn generate_summary_report(output_dir: &Path, summaries: &[ServiceSummary]) -> Result<()> {
    let path = output_dir.join(constants::SUMMARY_REPORT_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Service_Code", "Service_Name", "Total_Count", "Total_Revenue"])?;

    for row in summaries {
        wtr.write_record([
            &row.service_code,
            &row.service_name,
            &row.total_count.to_string(),
            &format!("{:.2}", row.total_revenue),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Print summary to console
pub fn print_summary(data: &ReportData) {
    let total_revenue: f64 = data.rows.iter().map(|r| r.monthly_revenue).sum();
    let total_expense: f64 = data.rows.iter().map(|r| r.monthly_expense).sum();
    let total_dep: f64 = data.rows.iter().map(|r| r.depreciation).sum();
    let exam_count: u64 = data.summaries.iter().map(|s| s.total_count).sum();

    println!("\n============================================================");
    println!(
        "  {} ({} {} {})",
        data.device.ae_title, data.device.bme_name, data.device.brand, data.device.model
    );
    println!("============================================================\n");

    println!("DEVICE:");
    println!("  CapEx:              ${:>12.2}", data.device.cap_ex);
    println!(
        "  Depreciation:       ${:>12.2} / month over {} months",
        data.device.monthly_dep, data.device.dep_months
    );
    if let Some(install) = data.device.install_date {
        println!("  Installed:          {}", install.format(constants::DATE_FORMAT_API));
    }

    println!("\nTOTALS:");
    println!("  Revenue P/L:        ${:>12.2}", total_revenue);
    println!("  SAP Expense:        ${:>12.2}", total_expense);
    println!("  Depreciation:       ${:>12.2}", total_dep);
    println!("  Exams:              {:>13}", exam_count);

    match aggregate::break_even_row(data.rows) {
        Some(i) => println!(
            "\n  Break-even reached: {}",
            data.rows[i].date.format(constants::DATE_FORMAT_API)
        ),
        None => println!("\n  Break-even not yet reached"),
    }

    if !data.summaries.is_empty() {
        println!("\nTOP PROCEDURES:");
        for row in data.summaries.iter().take(constants::SERVICE_PAGE_SIZE) {
            println!(
                "  {:<12} {:<30} {:>6} exams  ${:>10.2}",
                row.service_code, row.service_name, row.total_count, row.total_revenue
            );
        }
    }

    println!("============================================================");
}
