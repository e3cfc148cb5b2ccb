//! Offset pagination utilities.

use serde::Serialize;

/// Default page size when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Upper bound on page size.
pub const MAX_PER_PAGE: u32 = 200;

/// Normalized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
}

impl PageWindow {
    /// Clamps raw query values into a valid window. Page numbers start at 1.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

/// Pagination metadata returned alongside list responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl PageInfo {
    pub fn new(window: PageWindow, total: i64) -> Self {
        let per_page = window.per_page as i64;
        Self {
            page: window.page,
            per_page: window.per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}
