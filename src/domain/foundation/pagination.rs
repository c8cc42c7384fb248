//! Page request and page result for listing queries.

use serde::{Deserialize, Serialize};

use super::ValidationError;

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Builds a page from optional query parameters, applying defaults.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Result<Self, ValidationError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);

        if page == 0 {
            return Err(ValidationError::out_of_range("page", 1, i64::from(u32::MAX), 0));
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(ValidationError::out_of_range(
                "per_page",
                1,
                i64::from(MAX_PER_PAGE),
                i64::from(per_page),
            ));
        }
        Ok(Self { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// A page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        }
    }

    /// Converts the items, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Slices an in-memory, already filtered list.
    pub fn from_all(all: Vec<T>, page: Page) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();
        Self::new(items, total, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let page = Page::from_query(None, None).unwrap();
        assert_eq!(page, Page::default());
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn offset_accounts_for_page_size() {
        let page = Page::from_query(Some(3), Some(10)).unwrap();
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn zero_page_is_rejected() {
        assert!(Page::from_query(Some(0), None).is_err());
    }

    #[test]
    fn oversized_page_is_rejected() {
        let err = Page::from_query(None, Some(MAX_PER_PAGE + 1)).unwrap_err();
        assert_eq!(err.field(), "per_page");
    }

    #[test]
    fn from_all_slices_and_keeps_total() {
        let page = Page::from_query(Some(2), Some(2)).unwrap();
        let result = PageResult::from_all(vec![1, 2, 3, 4, 5], page);
        assert_eq!(result.items, vec![3, 4]);
        assert_eq!(result.total, 5);
    }
}
