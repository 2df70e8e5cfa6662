//! Cursor pagination.
//!
//! Every "list" endpoint on the platform returns pages of the shape
//! `{data, has_more, next_page}`. [`fetch_all`] drains such a collection into
//! one ordered vector, following cursors until the server signals the end.

use std::collections::VecDeque;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One page of a paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

/// Fetch every page of a collection, in order.
///
/// `fetch_page` is called with the cursor to resume from (`None` for the
/// first page) and the page size. Iteration continues only while the response
/// both reports `has_more` **and** supplies a non-empty `next_page` cursor; a
/// page that claims more data but omits the cursor ends the collection rather
/// than looping forever on a malformed response.
///
/// Every item is visited exactly once and the result preserves server order:
/// it is the concatenation of the pages as returned, never re-sorted.
pub async fn fetch_all<T, F, Fut>(mut fetch_page: F, page_size: u32) -> Result<Vec<T>, Error>
where
    F: FnMut(Option<String>, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    let mut pending: VecDeque<Option<String>> = VecDeque::new();
    pending.push_back(None);
    let mut items = Vec::new();

    while let Some(cursor) = pending.pop_front() {
        let page = fetch_page(cursor, page_size).await?;
        let has_more = page.has_more;
        items.extend(page.data);
        if let Some(next) = page.next_page {
            if has_more && !next.is_empty() {
                pending.push_back(Some(next));
            }
        }
    }

    Ok(items)
}
