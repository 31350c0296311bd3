//! Page sources
//!
//! A [`FeedSource`] knows how to fetch page `n` of a list, either as the JSON
//! envelope `{ html, has_next, page }` or as bare markup. The controller never
//! talks to the network directly.

mod http;

pub use http::{HttpFeedSource, DEFAULT_PAGE_PARAM};

use crate::error::Result;
use crate::pagination::FetchResult;
use async_trait::async_trait;

/// Fetches pages of list markup
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch a page as JSON.
    ///
    /// `Ok(None)` means the request succeeded without a usable body.
    async fn fetch_structured(&self, page: u32) -> Result<Option<FetchResult>>;

    /// Fetch a page as plain markup.
    ///
    /// `Ok(None)` means the body was blank.
    async fn fetch_markup(&self, page: u32) -> Result<Option<String>>;
}
