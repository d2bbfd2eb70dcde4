//! Cursor pagination parameters and page envelope shared by every list endpoint.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::db::engine::{Page, PageRequest};

/// Page position for list endpoints.
///
/// - `page_size`: items per page (default 50, clamped to 100, non-positive means default)
/// - `page_token`: the `next_page_token` of the previous page; absent or empty for the first page
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Maximum number of items to return (default: 50, max: 100)
    #[param(default = 50, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page_size: Option<i64>,

    /// Opaque token from a previous response
    pub page_token: Option<String>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.page_size, query.page_token)
    }
}

/// One page of results. `next_page_token` is absent on the last page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T: ToSchema> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T: ToSchema> PageResponse<T> {
    pub fn from_page<U>(page: Page<U>) -> Self
    where
        T: From<U>,
    {
        let page = page.map(T::from);
        Self {
            items: page.items,
            next_page_token: page.next_page_token,
        }
    }
}
