//! Page-based pagination for list endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

const fn default_page() -> i32 {
    1
}

const fn default_page_size() -> i32 {
    20
}

/// Pagination parameters taken from list query strings.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct Filters {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: i32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl Filters {
    /// SQL LIMIT value.
    #[must_use]
    pub const fn limit(self) -> i64 {
        self.page_size as i64
    }

    /// SQL OFFSET value.
    #[must_use]
    pub const fn offset(self) -> i64 {
        ((self.page - 1) * self.page_size) as i64
    }
}

/// Pagination metadata returned alongside list results.
///
/// All-zero when the result set is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i32,
    pub page_size: i32,
    pub first_page: i32,
    pub last_page: i32,
    pub total_records: i32,
}

impl Metadata {
    /// Compute metadata from the windowed total and the requested page.
    #[must_use]
    pub const fn calculate(total_records: i32, page: i32, page_size: i32) -> Self {
        if total_records == 0 {
            return Self {
                current_page: 0,
                page_size: 0,
                first_page: 0,
                last_page: 0,
                total_records: 0,
            };
        }
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_and_offset() {
        let filters = Filters {
            page: 3,
            page_size: 25,
        };
        assert_eq!(filters.limit(), 25);
        assert_eq!(filters.offset(), 50);
    }

    #[test]
    fn test_first_page_has_zero_offset() {
        let filters = Filters {
            page: 1,
            page_size: 20,
        };
        assert_eq!(filters.offset(), 0);
    }

    #[test]
    fn test_metadata_empty_result_set() {
        assert_eq!(Metadata::calculate(0, 4, 20), Metadata::default());
    }

    #[test]
    fn test_metadata_exact_division() {
        let meta = Metadata::calculate(100, 2, 20);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.first_page, 1);
        assert_eq!(meta.last_page, 5);
        assert_eq!(meta.total_records, 100);
    }

    #[test]
    fn test_metadata_rounds_last_page_up() {
        let meta = Metadata::calculate(101, 1, 20);
        assert_eq!(meta.last_page, 6);
    }

    #[test]
    fn test_filters_validation_bounds() {
        assert!(Filters {
            page: 0,
            page_size: 20
        }
        .validate()
        .is_err());
        assert!(Filters {
            page: 1,
            page_size: 101
        }
        .validate()
        .is_err());
        assert!(Filters::default().validate().is_ok());
    }
}
