//! Page/limit pagination shared by the list endpoints.

use serde::Deserialize;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound on requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A sanitised page request.
///
/// Page numbers start at 1; sizes are clamped to `1..=`[`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "PageQuery")]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    /// Build a page from optional raw query values, applying defaults and
    /// clamping out-of-range requests rather than rejecting them.
    pub fn new(number: Option<u32>, size: Option<u32>) -> Self {
        let number = number.unwrap_or(1).max(1);
        let size = size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Self { number, size }
    }

    /// 1-based page number.
    pub fn number(self) -> u32 {
        self.number
    }

    /// Number of records per page.
    pub fn size(self) -> u32 {
        self.size
    }

    /// Records to skip before this page starts.
    pub fn offset(self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Raw `?page=&limit=` query shape.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
struct PageQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

impl From<PageQuery> for Page {
    fn from(value: PageQuery) -> Self {
        Self::new(value.page, value.limit)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, DEFAULT_PAGE_SIZE, 0)]
    #[case(Some(0), Some(0), 1, 1, 0)]
    #[case(Some(3), Some(10), 3, 10, 20)]
    #[case(Some(2), Some(1000), 2, MAX_PAGE_SIZE, 100)]
    fn pages_are_sanitised(
        #[case] number: Option<u32>,
        #[case] size: Option<u32>,
        #[case] expected_number: u32,
        #[case] expected_size: u32,
        #[case] expected_offset: u64,
    ) {
        let page = Page::new(number, size);
        assert_eq!(page.number(), expected_number);
        assert_eq!(page.size(), expected_size);
        assert_eq!(page.offset(), expected_offset);
    }

    #[rstest]
    fn deserialises_from_query_shape() {
        let page: Page = serde_json::from_str(r#"{"page": 2, "limit": 5}"#).expect("valid query");
        assert_eq!(page.number(), 2);
        assert_eq!(page.size(), 5);
    }
}
