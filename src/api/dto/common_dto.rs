//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Zero-based item offset of the first entry on this page.
    ///
    /// Computed in `u64` so an oversized client-supplied page number
    /// yields an out-of-range offset (an empty page) instead of
    /// overflowing.
    #[must_use]
    pub fn offset(&self) -> usize {
        let clamped = self.clamped();
        let start = u64::from(clamped.page - 1) * u64::from(clamped.per_page);
        usize::try_from(start).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_clamp_to_first_page() {
        let params = PaginationParams { page: 0, per_page: 500 }.clamped();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn offset_advances_by_page() {
        let params = PaginationParams { page: 3, per_page: 20 };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn oversized_page_number_does_not_overflow() {
        let params = PaginationParams {
            page: u32::MAX,
            per_page: 100,
        };
        // Way past any real collection, so the page comes back empty.
        assert_eq!(params.offset(), 429_496_729_400);
    }
}
