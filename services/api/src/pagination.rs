//! Deterministic pagination over pipeline results

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::view::PipelineSpec;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound on a single window, to keep one request's work bounded
pub const MAX_PAGE_SIZE: i64 = 100;

/// A sanitized pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Coerce raw query parameters: missing values take the defaults,
    /// everything is clamped to a positive integer, and the page size is
    /// capped at [`MAX_PAGE_SIZE`].
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        PageRequest {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// One window of results plus total-count metadata
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

fn total_pages(total_items: i64, page_size: i64) -> i64 {
    (total_items + page_size - 1) / page_size
}

/// Window a pipeline under its declared total order.
///
/// The count is an independent aggregation over the spec's filters, taken
/// before windowing; a window past the end of the result set yields an
/// empty `items` list rather than an error.
pub async fn paginate(
    pool: &PgPool,
    spec: &PipelineSpec,
    request: PageRequest,
) -> sqlx::Result<Page<Value>> {
    let total_items = spec.count(pool).await?;
    let items = spec
        .fetch_window(pool, request.limit(), request.offset())
        .await?;

    Ok(Page {
        items,
        total_items,
        total_pages: total_pages(total_items, request.limit()),
        current_page: request.page(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::new(None, None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_coercion_to_positive_integers() {
        let req = PageRequest::new(Some(0), Some(-5));
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 1);

        let req = PageRequest::new(Some(-3), Some(0));
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 1);
    }

    #[test]
    fn test_page_size_cap() {
        let req = PageRequest::new(Some(2), Some(1000));
        assert_eq!(req.limit(), MAX_PAGE_SIZE);
        assert_eq!(req.offset(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_math() {
        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page {
            items: vec![1, 2, 3],
            total_items: 25,
            total_pages: 3,
            current_page: 1,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalItems"], 25);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }
}
