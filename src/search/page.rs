use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// A requested page; `page` is 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Clamps out-of-range values into the accepted range.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta::new(*self, total)
    }
}

/// Pagination metadata returned next to a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize, ToSchema)]
pub struct PageMeta {
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub limit: u32,
    #[schema(example = 57)]
    pub total: i64,
    #[schema(example = 3)]
    pub pages: i64,
}

impl PageMeta {
    pub fn new(page: Page, total: i64) -> Self {
        let limit = i64::from(page.limit.max(1));
        Self {
            page: page.page,
            limit: page.limit,
            total,
            pages: (total.max(0) + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Page::new(1, 20).offset(), 0);
        assert_eq!(Page::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_new_clamps() {
        assert_eq!(Page::new(0, 0), Page { page: 1, limit: 1 });
        assert_eq!(Page::new(2, 500).limit, MAX_LIMIT);
    }

    #[test]
    fn test_meta_rounds_pages_up() {
        let meta = Page::new(2, 20).meta(41);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.total, 41);
        assert_eq!(Page::default().meta(0).pages, 0);
        assert_eq!(Page::default().meta(20).pages, 1);
    }
}
