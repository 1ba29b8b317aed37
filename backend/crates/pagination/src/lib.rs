//! Page-number pagination primitives shared by list endpoints.
//!
//! Callers describe what they want with a [`PageRequest`], resolve it against
//! the number of available items into a [`PageWindow`], and either hand the
//! window's `offset`/`limit` to a database query or slice an in-memory
//! collection with [`Page::from_items`].
//!
//! Requests never fail because of the page number: a page beyond the last one
//! clamps to the last page, and an empty collection still has one (empty)
//! page.
//!
//! # Examples
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(4, 5).expect("non-zero page size");
//! let page = Page::from_items((1..=12).collect::<Vec<u32>>(), request);
//!
//! assert_eq!(page.items(), &[11, 12]);
//! assert_eq!(page.window().page(), 3);
//! assert!(!page.window().has_next());
//! ```

use serde::Serialize;

/// The page served when a caller does not ask for one.
pub const FIRST_PAGE: u64 = 1;

/// Errors raised while building pagination requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The page size must hold at least one item.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// A caller's request for one page of a collection.
///
/// ## Invariants
/// - `page` is at least [`FIRST_PAGE`].
/// - `page_size` is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u32,
}

impl PageRequest {
    /// Build a request for `page` with `page_size` items per page.
    ///
    /// Page numbers below [`FIRST_PAGE`] are raised to it.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPageSize`] when `page_size` is zero.
    pub const fn new(page: u64, page_size: u32) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        let clamped = if page < FIRST_PAGE { FIRST_PAGE } else { page };
        Ok(Self {
            page: clamped,
            page_size,
        })
    }

    /// Build a request from an untrusted query-string value.
    ///
    /// Missing, non-numeric and non-positive values select the first page.
    /// Digit strings too large for `u64` saturate and later clamp to the
    /// last page.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPageSize`] when `page_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::from_query(Some("abc"), 5).expect("valid size");
    /// assert_eq!(request.page(), 1);
    /// ```
    pub fn from_query(raw: Option<&str>, page_size: u32) -> Result<Self, PaginationError> {
        let page = raw.and_then(parse_page_number).unwrap_or(FIRST_PAGE);
        Self::new(page, page_size)
    }

    /// Requested page number, one-based.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Resolve the request against the number of available items.
    #[must_use]
    pub fn window(&self, total_items: u64) -> PageWindow {
        PageWindow::resolve(*self, total_items)
    }
}

fn parse_page_number(raw: &str) -> Option<u64> {
    let digits = raw.trim();
    match digits.parse::<u64>() {
        Ok(page) => Some(page),
        Err(_) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            Some(u64::MAX)
        }
        Err(_) => None,
    }
}

/// A request resolved against a concrete collection size.
///
/// Serialises as the pagination metadata returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    page: u64,
    total_pages: u64,
    total_items: u64,
    page_size: u32,
    has_next: bool,
    has_previous: bool,
}

impl PageWindow {
    fn resolve(request: PageRequest, total_items: u64) -> Self {
        let size = u64::from(request.page_size);
        let total_pages = total_items.div_ceil(size).max(FIRST_PAGE);
        let page = request.page.min(total_pages);
        Self {
            page,
            total_pages,
            total_items,
            page_size: request.page_size,
            has_next: page < total_pages,
            has_previous: page > FIRST_PAGE,
        }
    }

    /// Effective page number after clamping.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Number of pages; at least one even for an empty collection.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Number of items across all pages.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.has_previous
    }

    /// Number of items to skip before the current page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(FIRST_PAGE)
            .saturating_mul(u64::from(self.page_size))
    }

    /// Maximum number of items on the current page.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of items together with its resolved window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    window: PageWindow,
}

impl<T> Page<T> {
    /// Assemble a page from items already limited to the window.
    #[must_use]
    pub const fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    /// Slice a complete, already ordered collection down to one page.
    #[must_use]
    pub fn from_items(all: Vec<T>, request: PageRequest) -> Self {
        let total = u64::try_from(all.len()).unwrap_or(u64::MAX);
        let window = request.window(total);
        let skip = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(window.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self { items, window }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Resolved window describing this page.
    #[must_use]
    pub const fn window(&self) -> &PageWindow {
        &self.window
    }

    /// Split the page into its items and window.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, PageWindow) {
        (self.items, self.window)
    }

    /// Transform every item while keeping the window.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}
