//! Paginated fetch aggregation
//!
//! Upstream list endpoints return one page at a time together with a
//! `has_more` flag. `pages` walks those pages lazily as a stream and
//! `fetch_all` concatenates them into a single `Page`.

use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::ApiError;

/// An upstream record: a JSON object with no fixed schema
pub type Record = Value;

/// Pagination block attached to each page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Zero-based number of this page
    pub page_number: u32,
    /// Whether another page follows this one
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// One page of records, or the concatenation of several
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Vec<Record>,
    /// Missing on endpoints that do not paginate
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl Page {
    /// True if the upstream reported another page after this one
    pub fn has_more(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_more)
    }
}

/// Something that can fetch a single page of an endpoint
pub trait PageSource {
    /// Fetches page `page_number` (zero-based) of `path`
    fn fetch_page(
        &self,
        path: &str,
        page_number: u32,
    ) -> impl Future<Output = Result<Page, ApiError>> + Send;
}

/// Lazily fetches the pages of `path`, starting at page 0
///
/// The stream ends after the first page whose `has_more` is false, or once
/// `max_pages` pages have been fetched. A fetch error is yielded as the last
/// item. Each call starts a new walk from page 0.
pub fn pages<'a, S>(
    source: &'a S,
    path: &'a str,
    max_pages: u32,
) -> impl Stream<Item = Result<Page, ApiError>> + 'a
where
    S: PageSource + ?Sized,
{
    let max_pages = max_pages.max(1);

    stream::try_unfold(Some(0u32), move |next| async move {
        let Some(page_number) = next else {
            return Ok::<_, ApiError>(None);
        };

        if page_number >= max_pages {
            warn!(
                path,
                max_pages, "page limit reached while upstream still reports more pages"
            );
            return Ok(None);
        }

        debug!(path, page_number, "fetching page");
        let page = source.fetch_page(path, page_number).await?;
        let next = page.has_more().then_some(page_number + 1);
        Ok(Some((page, next)))
    })
}

/// Fetches every page of `path` and concatenates their items
///
/// # Returns
/// * `Ok(Page)` - All items in page order, with the last page's pagination block
/// * `Err(ApiError)` - The first failed page fetch; no partial result is kept
pub async fn fetch_all<S>(source: &S, path: &str, max_pages: u32) -> Result<Page, ApiError>
where
    S: PageSource + ?Sized,
{
    let combined = pages(source, path, max_pages)
        .try_fold(Page::default(), |mut acc, page| async move {
            acc.items.extend(page.items);
            acc.pagination = page.pagination;
            Ok::<_, ApiError>(acc)
        })
        .await?;

    info!(path, items = combined.items.len(), "fetched all pages");
    Ok(combined)
}
