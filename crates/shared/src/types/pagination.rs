//! Pagination types for the operation history.
//!
//! A limit of `-1` means "no limit": the whole history is returned as a
//! single page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limit value that disables pagination.
pub const UNBOUNDED_LIMIT: i64 = -1;

/// Invalid pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// Page number is negative.
    #[error("page must be greater than or equal to 0, got {0}")]
    BadPage(i64),

    /// Limit is below the unbounded marker.
    #[error("limit must be greater than or equal to -1, got {0}")]
    BadLimit(i64),
}

/// Validated request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: UNBOUNDED_LIMIT,
        }
    }
}

impl PageRequest {
    /// Validates raw page parameters.
    ///
    /// Page `0` is treated as the first page.
    pub fn new(page: i64, limit: i64) -> Result<Self, PageError> {
        if page < 0 {
            return Err(PageError::BadPage(page));
        }
        if limit < UNBOUNDED_LIMIT {
            return Err(PageError::BadLimit(limit));
        }

        Ok(Self {
            page: page.max(1),
            limit,
        })
    }

    /// Page number (1-indexed).
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Returns true if the whole history is requested.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.limit == UNBOUNDED_LIMIT
    }

    /// Returns the limit for database queries, `None` when unbounded.
    #[must_use]
    pub fn limit(&self) -> Option<u64> {
        u64::try_from(self.limit).ok()
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        let Some(limit) = self.limit() else {
            return 0;
        };
        let skipped_pages = u64::try_from(self.page - 1).unwrap_or(0);
        limit.saturating_mul(skipped_pages)
    }

    /// Total number of pages for `total` items.
    ///
    /// `ceil(total / limit)` for a positive limit. Unbounded and zero
    /// limits always yield a single page. An empty history also reports
    /// one page rather than the `0` the formula gives, so a client can
    /// always request page 1.
    #[must_use]
    pub fn pages_total(&self, total: u64) -> u64 {
        match self.limit() {
            Some(limit) if limit > 0 && total > 0 => total.div_ceil(limit),
            _ => 1,
        }
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number.
    pub page: i64,
    /// Total number of pages.
    pub pages_total: u64,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            pages_total: request.pages_total(total),
        }
    }
}
