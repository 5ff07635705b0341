//! Page arithmetic for listings.

use serde::Serialize;

/// Number of pages needed for `total_items`. An empty listing still has one
/// (empty) page.
pub fn num_pages(total_items: u64, page_size: u64) -> u64 {
    if total_items == 0 || page_size == 0 {
        1
    } else {
        total_items.div_ceil(page_size)
    }
}

/// Resolve a raw `page` query value to a 1-based page number.
///
/// Missing or non-numeric values select the first page. Numeric values
/// outside `1..=num_pages` select the last page.
pub fn resolve_page_number(raw: Option<&str>, num_pages: u64) -> u64 {
    let last = num_pages.max(1);
    match raw.and_then(|value| value.trim().parse::<i64>().ok()) {
        None => 1,
        Some(number) if number < 1 || number as u64 > last => last,
        Some(number) => number as u64,
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, total_items: u64, page_size: u64) -> Self {
        let num_pages = num_pages(total_items, page_size);
        let has_next = number < num_pages;
        let has_previous = number > 1;

        Self {
            items,
            number,
            num_pages,
            total_items,
            page_size,
            has_next,
            has_previous,
            next_page_number: has_next.then(|| number + 1),
            previous_page_number: has_previous.then(|| number - 1),
        }
    }
}
