//! Success envelope shared by every endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::search::PageMeta;

/// `{success, data?, pagination?, message?, fromCache?}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[schema(example = true)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Present on cache-aside reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            message: None,
            from_cache: None,
        }
    }

    pub fn paged(data: T, pagination: PageMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn from_cache(mut self, hit: bool) -> Self {
        self.from_cache = Some(hit);
        self
    }
}

impl ApiResponse<()> {
    /// Envelope without a payload, for actions such as deletes.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            pagination: None,
            message: Some(message.into()),
            from_cache: None,
        }
    }
}

/// A page of items with its pagination metadata, the unit that is cached
/// for listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> From<Paged<T>> for ApiResponse<Vec<T>> {
    fn from(page: Paged<T>) -> Self {
        ApiResponse::paged(page.items, page.pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Page;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(body, json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn test_paged_envelope_with_cache_flag() {
        let page = Paged {
            items: vec!["a"],
            pagination: Page::new(1, 20).meta(1),
        };
        let body = serde_json::to_value(ApiResponse::from(page).from_cache(true)).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": ["a"],
                "pagination": { "page": 1, "limit": 20, "total": 1, "pages": 1 },
                "fromCache": true
            })
        );
    }

    #[test]
    fn test_message_only_envelope() {
        let body = serde_json::to_value(ApiResponse::message("Job removed from saved")).unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "message": "Job removed from saved" })
        );
    }
}
