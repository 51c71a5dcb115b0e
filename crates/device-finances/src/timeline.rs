//! Date axis generation
//!
//! All charts for a device share one ordered sequence of first-of-month
//! dates. The axis spans from the earliest observed date to the later of the
//! latest observed date and a few months past today, so the charts always
//! show a short future window.

use chrono::{Datelike, Months, NaiveDate};

/// Generate the monthly date axis from a set of observed dates.
///
/// Output is strictly increasing, deduplicated, first-of-month dates.
/// Empty input yields an empty axis.
pub fn generate_date_axis(
    dates: &[NaiveDate],
    today: NaiveDate,
    future_months: u32,
) -> Vec<NaiveDate> {
    let Some(min) = dates.iter().min() else {
        return Vec::new();
    };
    let data_max = *dates.iter().max().expect("non-empty");

    let mut current = min.with_day(1).expect("day 1 is always valid");
    let future = (today + Months::new(future_months))
        .with_day(1)
        .expect("day 1 is always valid");
    let max = data_max.max(future);

    let mut axis = Vec::new();
    while current <= max {
        axis.push(current);
        current = current + Months::new(1);
    }
    axis
}

/// Initial chart viewing window: `window_years` starting at the install
/// date, clamped to the axis bounds. Without an install date the window is
/// the whole axis. Returns `None` for an empty axis.
pub fn initial_date_window(
    install_date: Option<NaiveDate>,
    axis: &[NaiveDate],
    window_years: u32,
) -> Option<(NaiveDate, NaiveDate)> {
    let min = *axis.first()?;
    let max = *axis.last()?;

    match install_date {
        Some(install) => {
            let end = install + Months::new(window_years * 12);
            Some((install.max(min), end.min(max)))
        }
        None => Some((min, max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_input_empty_axis() {
        assert!(generate_date_axis(&[], d("2025-06-15"), 3).is_empty());
    }

    #[test]
    fn test_axis_spans_min_to_future() {
        // Data ends before today, so the future extension wins.
        let axis = generate_date_axis(&[d("2025-01-15"), d("2025-02-03")], d("2025-03-10"), 3);
        assert_eq!(axis.first(), Some(&d("2025-01-01")));
        assert_eq!(axis.last(), Some(&d("2025-06-01")));
        // Strictly increasing first-of-month steps.
        for pair in axis.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[1].day(), 1);
        }
        assert_eq!(axis.len(), 6);
    }

    #[test]
    fn test_data_max_beyond_future_window() {
        let axis = generate_date_axis(&[d("2025-01-01"), d("2026-02-20")], d("2025-03-10"), 3);
        assert_eq!(axis.last(), Some(&d("2026-02-01")));
        assert_eq!(axis.len(), 14);
    }

    #[test]
    fn test_duplicate_dates_collapse() {
        let axis = generate_date_axis(
            &[d("2025-01-05"), d("2025-01-20"), d("2025-01-31")],
            d("2025-01-10"),
            0,
        );
        assert_eq!(axis, vec![d("2025-01-01")]);
    }

    #[test]
    fn test_initial_window_clamped_to_axis() {
        let axis = generate_date_axis(&[d("2024-01-01"), d("2026-06-01")], d("2026-06-01"), 0);
        let (start, end) = initial_date_window(Some(d("2023-06-15")), &axis, 3).unwrap();
        // Install predates the axis, so the window starts at the axis minimum.
        assert_eq!(start, d("2024-01-01"));
        assert_eq!(end, d("2026-06-01"));
    }

    #[test]
    fn test_initial_window_without_install_date() {
        let axis = generate_date_axis(&[d("2024-01-01"), d("2024-06-01")], d("2024-03-01"), 0);
        let (start, end) = initial_date_window(None, &axis, 3).unwrap();
        assert_eq!((start, end), (d("2024-01-01"), d("2024-06-01")));
    }
}
