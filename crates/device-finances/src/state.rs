//! Cross-filter state machine
//!
//! One explicit state value mutated only through `apply`, which maps a user
//! action to the next state and tells the caller how much work the change
//! requires: reload the device dataset, re-run the aggregator, or just
//! redraw from what is cached.

/// Current dashboard filters and pagination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Selected device, None before the first selection
    pub ae_title: Option<String>,
    /// Active month filter ("2025-01")
    pub month: Option<String>,
    /// Active year filter ("2025")
    pub year: Option<String>,
    /// Active service-code filter
    pub service: Option<String>,
    /// Current page of the service breakdown
    pub page: usize,
}

/// Discrete user actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Device dropdown changed (None clears the view)
    SelectDevice(Option<String>),
    /// Click on a monthly or cumulative chart point
    ToggleMonth(String),
    /// Click on a service-breakdown bar
    ToggleService(String),
    /// Year dropdown changed
    SetYear(Option<String>),
    /// Prev/next page button
    ChangePage(isize),
    /// "Clear filters" button
    ClearFilters,
}

/// What the caller must recompute after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the device dataset, then re-aggregate and redraw
    Reload,
    /// Re-run the aggregator (service filter changed), then redraw
    Reaggregate,
    /// Redraw from cached aggregation (summary-level change only)
    Redraw,
    /// Nothing changed
    None,
}

fn toggle(current: &mut Option<String>, value: String) {
    if current.as_deref() == Some(value.as_str()) {
        *current = None;
    } else {
        *current = Some(value);
    }
}

impl FilterState {
    /// Apply a user action. `total_pages` bounds page navigation and comes
    /// from the currently displayed summary.
    pub fn apply(&mut self, action: Action, total_pages: usize) -> Effect {
        match action {
            Action::SelectDevice(ae_title) => {
                let selected = ae_title.is_some();
                self.ae_title = ae_title;
                self.month = None;
                self.year = None;
                self.service = None;
                self.page = 0;
                if selected { Effect::Reload } else { Effect::Redraw }
            }
            Action::ToggleMonth(year_month) => {
                toggle(&mut self.month, year_month);
                self.page = 0;
                // The month filter only feeds the summary step, the
                // aggregated series is untouched.
                Effect::Redraw
            }
            Action::ToggleService(code) => {
                toggle(&mut self.service, code);
                Effect::Reaggregate
            }
            Action::SetYear(year) => {
                self.year = year;
                self.page = 0;
                Effect::Redraw
            }
            Action::ChangePage(delta) => {
                let next = self.page as isize + delta;
                if next < 0 || (next as usize) >= total_pages {
                    // Out-of-range requests are no-ops, not wrapped.
                    return Effect::None;
                }
                self.page = next as usize;
                Effect::Redraw
            }
            Action::ClearFilters => {
                self.month = None;
                self.year = None;
                self.service = None;
                self.page = 0;
                Effect::Reaggregate
            }
        }
    }

    /// Snap the page back to 0 when the summary no longer covers it.
    /// Called before every render of the breakdown chart.
    pub fn snap_page(&mut self, total_items: usize, page_size: usize) {
        if page_size == 0 || self.page * page_size >= total_items {
            self.page = 0;
        }
    }
}
