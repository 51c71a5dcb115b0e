//! Per-procedure summary and pagination
//!
//! Groups the filtered transaction set by service code into summary rows
//! sorted by revenue, then slices them into fixed-size pages for the
//! breakdown chart. An active service filter highlights its row instead of
//! excluding the others, so the full procedure mix stays visible.

use std::collections::HashMap;

use crate::constants;
use crate::dataset::ProcedureRecord;

/// One row of the per-procedure breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSummary {
    pub service_code: String,
    /// First-seen non-empty display name, sentinel "-" otherwise
    pub service_name: String,
    pub total_count: u64,
    pub total_revenue: f64,
    /// Row matches the active service filter
    pub highlighted: bool,
}

/// Summarize records for a device under the current filters.
///
/// Month and year filters restrict the set; the service filter only marks
/// its row as highlighted. Rows are grouped by service code (sentinel "-"
/// for blank codes) and sorted strictly descending by total revenue; the
/// sort is stable, so ties keep encounter order.
pub fn summarize(
    records: &[ProcedureRecord],
    ae_title: &str,
    month_filter: Option<&str>,
    year_filter: Option<&str>,
    service_filter: Option<&str>,
) -> Vec<ServiceSummary> {
    let mut summaries: Vec<ServiceSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        if record.ae_title != ae_title {
            continue;
        }
        if let Some(month) = month_filter {
            if record.year_month != month {
                continue;
            }
        }
        if let Some(year) = year_filter {
            if !record.year_month.starts_with(year) {
                continue;
            }
        }

        let code = if record.service_code.is_empty() {
            constants::SENTINEL_SERVICE_CODE
        } else {
            record.service_code.as_str()
        };

        let idx = *index.entry(code.to_string()).or_insert_with(|| {
            summaries.push(ServiceSummary {
                service_code: code.to_string(),
                service_name: constants::SENTINEL_SERVICE_CODE.to_string(),
                total_count: 0,
                total_revenue: 0.0,
                highlighted: service_filter == Some(code),
            });
            summaries.len() - 1
        });

        let entry = &mut summaries[idx];
        if entry.service_name == constants::SENTINEL_SERVICE_CODE && !record.service_name.is_empty()
        {
            entry.service_name = record.service_name.clone();
        }
        entry.total_count += record.order_qty;
        entry.total_revenue += record.revenue_pl;
    }

    // Vec::sort_by is stable; encounter order survives revenue ties.
    summaries.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

/// Number of pages needed for `total` items, 0 when empty
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Slice one page out of the summary rows.
///
/// The page index is clamped to the last valid page (0 when the set is
/// empty), so callers never receive an out-of-range slice.
pub fn paginate(summaries: &[ServiceSummary], page: usize, page_size: usize) -> &[ServiceSummary] {
    if summaries.is_empty() || page_size == 0 {
        return &[];
    }
    let pages = total_pages(summaries.len(), page_size);
    let page = page.min(pages - 1);
    let start = page * page_size;
    let end = (start + page_size).min(summaries.len());
    &summaries[start..end]
}
