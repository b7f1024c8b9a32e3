//! Page arithmetic for the quotes listings.

use serde::Serialize;

/// Splits `total` items into pages of `per_page`.
///
/// There is always at least one page, even when `total` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: u64,
    per_page: u64,
}

/// One resolved page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
    pub previous: Option<u64>,
    pub next: Option<u64>,
}

impl Paginator {
    pub fn new(total: u64, per_page: u64) -> Self {
        Paginator {
            total,
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// Strict lookup: `None` when `number` is outside `1..=num_pages`.
    pub fn page(&self, number: u64) -> Option<PageWindow> {
        if number == 0 || number > self.num_pages() {
            return None;
        }
        Some(self.window(number))
    }

    /// Lenient lookup: unparsable or missing input gives the first page,
    /// numbers past the end give the last page.
    pub fn get_page(&self, raw: Option<&str>) -> PageWindow {
        let number = match raw.and_then(|r| r.trim().parse::<u64>().ok()) {
            Some(0) | None => 1,
            Some(n) => n.min(self.num_pages()),
        };
        self.window(number)
    }

    fn window(&self, number: u64) -> PageWindow {
        let num_pages = self.num_pages();
        PageWindow {
            number,
            num_pages,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
            previous: (number > 1).then(|| number - 1),
            next: (number < num_pages).then(|| number + 1),
        }
    }
}

impl PageWindow {
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn previous_number(&self) -> u64 {
        self.previous.unwrap_or(self.number)
    }

    pub fn next_number(&self) -> u64 {
        self.next.unwrap_or(self.number)
    }
}
