//! Fixed-size pagination over an already filtered and sorted list.

use serde::Serialize;

/// Listing page size. Not user-configurable.
pub const PAGE_SIZE: usize = 12;

/// One page of results. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Number of pages needed for `count` items; 0 for an empty list.
pub const fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Slice `[(page-1)*size, page*size)` out of `records`.
///
/// The paginator never self-corrects: page 0, or a page past the last one,
/// yields an empty `items` with the correct `total_pages`. Callers clamp.
pub fn paginate<T: Clone>(records: &[T], page_size: usize, page: usize) -> Page<T> {
    let total_pages = total_pages(records.len(), page_size);
    let items = if page == 0 || page > total_pages {
        Vec::new()
    } else {
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(records.len());
        records[start..end].to_vec()
    };
    Page {
        items,
        page,
        total_pages,
        total_items: records.len(),
    }
}

/// Clamp a requested page into `[1, max(total_pages, 1)]`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}
