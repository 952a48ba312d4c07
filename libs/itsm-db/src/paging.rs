//! Page normalisation and the `Page<T>` envelope returned by list operations.

use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;
use crate::error::RepoError;

/// Page request as received from callers. Values are normalised by
/// [`PageRequest::window`]; nothing here is trusted yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    #[must_use]
    pub fn first(page_size: i64) -> Self {
        Self { page: 1, page_size }
    }

    /// Resolve to a concrete LIMIT/OFFSET window.
    ///
    /// `page < 1` becomes 1 and `page_size <= 0` becomes the configured
    /// default.
    ///
    /// # Errors
    /// `MalformedInput` when `page_size` exceeds the configured maximum or the
    /// offset does not fit in a signed 64-bit integer.
    pub fn window(&self, cfg: &PagingConfig) -> Result<Window, RepoError> {
        let page = u64::try_from(self.page).ok().filter(|p| *p >= 1).unwrap_or(1);
        let page_size = match u64::try_from(self.page_size) {
            Ok(0) | Err(_) => cfg.default_page_size,
            Ok(size) => size,
        };
        if page_size > cfg.max_page_size {
            return Err(RepoError::malformed(
                "page_size",
                format!("{page_size} exceeds the maximum of {}", cfg.max_page_size),
            ));
        }
        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| RepoError::malformed("page", format!("page {page} is out of range")))?;
        Ok(Window {
            page,
            page_size,
            offset,
        })
    }
}

/// Normalised paging window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub page: u64,
    pub page_size: u64,
    pub offset: u64,
}

/// One page of results plus the total matching row count.
///
/// `total` is computed with the same predicate as `items`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, window: Window) -> Self {
        Self {
            items,
            total,
            page: window.page,
            page_size: window.page_size,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PagingConfig {
        PagingConfig::default()
    }

    #[test]
    fn page_below_one_becomes_first_page() {
        for page in [0, -1, i64::MIN] {
            let w = PageRequest::new(page, 20).window(&cfg()).unwrap();
            assert_eq!((w.page, w.offset), (1, 0));
        }
    }

    #[test]
    fn non_positive_size_uses_default() {
        for size in [0, -5] {
            let w = PageRequest::new(3, size).window(&cfg()).unwrap();
            assert_eq!(w.page_size, 50);
            assert_eq!(w.offset, 100);
        }
    }

    #[test]
    fn size_above_maximum_is_rejected() {
        let err = PageRequest::new(1, 1001).window(&cfg()).unwrap_err();
        assert!(matches!(
            err,
            RepoError::MalformedInput {
                field: "page_size",
                ..
            }
        ));
        assert!(PageRequest::new(1, 1000).window(&cfg()).is_ok());
    }

    #[test]
    fn offset_overflow_is_rejected() {
        let err = PageRequest::new(i64::MAX, 1000).window(&cfg()).unwrap_err();
        assert!(matches!(err, RepoError::MalformedInput { field: "page", .. }));
    }

    #[test]
    fn default_request_is_first_default_page() {
        let w = PageRequest::default().window(&cfg()).unwrap();
        assert_eq!(
            w,
            Window {
                page: 1,
                page_size: 50,
                offset: 0
            }
        );
    }

    #[test]
    fn page_carries_window_and_total() {
        let window = PageRequest::new(2, 10).window(&cfg()).unwrap();
        let page = Page::new(vec![1, 2, 3], 23, window);
        assert_eq!((page.page, page.page_size, page.total), (2, 10, 23));
        let doubled = page.map(|x| x * 2);
        assert_eq!(doubled.items, vec![2, 4, 6]);
        assert_eq!(doubled.page, 2);
    }
}
