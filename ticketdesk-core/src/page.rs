//! Pagination parameters for windowed queries.
//!
//! A [`PageRequest`] holds whatever a caller asked for, including out-of-range values.
//! [`PageRequest::normalized`] clamps it into a [`Pagination`], which is always safe to
//! turn into an offset and limit.

use serde::{Deserialize, Serialize};

/// Pagination as requested by a caller. Pages are 1-indexed.
///
/// # Example
///
/// ```ignore
/// use ticketdesk_core::page::PageRequest;
///
/// let window = PageRequest::new(0, 500).normalized(50);
/// assert_eq!(window.page, 1);
/// assert_eq!(window.limit, 50);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The requested page number.
    pub page: i64,
    /// The requested number of items per page.
    pub limit: i64,
}

impl PageRequest {
    /// Creates a page request without checking either value.
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Clamps this request into a usable window.
    ///
    /// The page becomes at least 1 and the limit is kept within `1..=max_limit`.
    /// A `max_limit` below one is treated as one.
    pub fn normalized(&self, max_limit: i64) -> Pagination {
        let page = self.page.max(1) as u64;
        let limit = self.limit.clamp(1, max_limit.max(1)) as u64;

        Pagination { page, limit }
    }
}

/// A clamped page window: `page >= 1` and `limit >= 1`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// The page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
}

impl Pagination {
    /// Number of items to skip before this page starts.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1))
            .saturating_mul(self.limit)
            .try_into()
            .unwrap_or(usize::MAX)
    }

    /// Number of items per page as a `usize`.
    pub fn take(&self) -> usize {
        self.limit
            .try_into()
            .unwrap_or(usize::MAX)
    }

    /// How many items this page holds when `total` items match overall.
    pub fn len_for_total(&self, total: u64) -> usize {
        let offset = self.offset() as u64;

        if total <= offset {
            return 0;
        }

        (total - offset)
            .min(self.limit)
            .try_into()
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_low_values() {
        let window = PageRequest::new(-3, 0).normalized(50);
        assert_eq!(window, Pagination { page: 1, limit: 1 });
    }

    #[test]
    fn test_normalized_caps_limit() {
        let window = PageRequest::new(4, 51).normalized(50);
        assert_eq!(window, Pagination { page: 4, limit: 50 });
    }

    #[test]
    fn test_normalized_with_non_positive_max() {
        assert_eq!(PageRequest::new(1, 20).normalized(0), Pagination { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(1, 20).normalized(-4), Pagination { page: 1, limit: 1 });
    }

    #[test]
    fn test_normalized_keeps_valid_values() {
        let window = PageRequest::new(2, 3).normalized(50);
        assert_eq!(window, Pagination { page: 2, limit: 3 });
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination { page: 1, limit: 8 }.offset(), 0);
        assert_eq!(Pagination { page: 3, limit: 20 }.offset(), 40);
    }

    #[test]
    fn test_len_for_total() {
        let window = Pagination { page: 2, limit: 3 };
        assert_eq!(window.len_for_total(10), 3);
        assert_eq!(window.len_for_total(4), 1);
        assert_eq!(window.len_for_total(3), 0);
        assert_eq!(window.len_for_total(0), 0);
    }
}
