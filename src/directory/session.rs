//! Session-local browsing state and the full listing pipeline.

use super::filter::{self, FilterState, FilterUpdate, TagAxis};
use super::paginate::{PAGE_SIZE, Page, clamp_page, paginate, total_pages};
use super::sort::{self, SortKey};
use crate::record::InstitutionRecord;
use serde::Serialize;

/// Everything one client has selected. Never persisted.
///
/// Changing the query, the filters or the sort key resets to page 1; only
/// [`Session::goto_page`] moves the cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub query: String,
    pub filters: FilterState,
    pub sort: SortKey,
    pub page: usize,
}

/// Result of running the pipeline once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub query: String,
    pub sort: SortKey,
    pub active_filters: usize,
    #[serde(flatten)]
    pub page: Page<InstitutionRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            query: String::new(),
            filters: FilterState::default(),
            sort: SortKey::default(),
            page: 1,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn update_filter(&mut self, update: FilterUpdate) {
        self.filters = self.filters.with(update);
        self.page = 1;
    }

    pub fn toggle_tag(&mut self, axis: TagAxis, value: &str) {
        self.filters = self.filters.toggle_tag(axis, value);
        self.page = 1;
    }

    pub fn remove_tag(&mut self, axis: TagAxis, value: &str) {
        self.filters = self.filters.without_tag(axis, value);
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.page = 1;
    }

    /// Move to `requested`, clamped to the pages the current result set has.
    /// Returns the page actually selected.
    pub fn goto_page(&mut self, requested: usize, records: &[InstitutionRecord]) -> usize {
        let matching = filter::apply(records, &self.query, &self.filters).len();
        self.page = clamp_page(requested, total_pages(matching, PAGE_SIZE));
        self.page
    }

    /// Filter, sort and paginate `records` with this session's state.
    pub fn listing(&self, records: &[InstitutionRecord]) -> Listing {
        run_pipeline(records, &self.query, &self.filters, self.sort, self.page)
    }
}

/// Record source output -> filter -> sort -> paginate.
pub fn run_pipeline(
    records: &[InstitutionRecord],
    query: &str,
    filters: &FilterState,
    sort_key: SortKey,
    page: usize,
) -> Listing {
    let filtered = filter::apply(records, query, filters);
    let sorted = sort::apply(&filtered, sort_key);
    Listing {
        query: query.to_string(),
        sort: sort_key,
        active_filters: filters.active_count(),
        page: paginate(&sorted, PAGE_SIZE, page),
    }
}
