//! Page-number pagination helpers shared by the listing endpoints.

use crate::error::CoreError;

/// Default page size for paginated listings.
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated `(page, page_size)` pair. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Validate optional client values, applying defaults.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(CoreError::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(CoreError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Alias for `page_size`, for SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Number of pages for `total` items; at least 1 even when empty.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 1;
    }
    ((total + page_size - 1) / page_size).max(1)
}

/// Validate a `limit` parameter within `1..=max`, applying `default`.
pub fn bounded_limit(limit: Option<i64>, default: i64, max: i64) -> Result<i64, CoreError> {
    let limit = limit.unwrap_or(default);
    if !(1..=max).contains(&limit) {
        return Err(CoreError::Validation(format!(
            "limit must be between 1 and {max}, got {limit}"
        )));
    }
    Ok(limit)
}
