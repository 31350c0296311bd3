//! HTTP page source
//!
//! Requests `GET <endpoint>?page=<n>` the way a same-origin XHR would, with
//! `X-Requested-With: XMLHttpRequest` so the server answers with its
//! fragment instead of the full page.

use super::FeedSource;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::FetchResult;
use async_trait::async_trait;
use tracing::trace;
use url::Url;

/// Default query parameter carrying the page number
pub const DEFAULT_PAGE_PARAM: &str = "page";

const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Page source backed by the list's own URL
#[derive(Debug)]
pub struct HttpFeedSource {
    client: HttpClient,
    endpoint: Url,
    page_param: String,
}

impl HttpFeedSource {
    /// Create a source for an absolute endpoint URL
    pub fn new(client: HttpClient, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            page_param: DEFAULT_PAGE_PARAM.to_string(),
        })
    }

    /// Use a different page query parameter
    #[must_use]
    pub fn with_page_param(mut self, param: impl Into<String>) -> Self {
        self.page_param = param.into();
        self
    }

    /// Endpoint URL without the page parameter
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Page query parameter name
    pub fn page_param(&self) -> &str {
        &self.page_param
    }

    /// URL for a page. Other query parameters on the endpoint are kept and
    /// any existing page parameter is replaced.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != self.page_param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair(&self.page_param, &page.to_string());
        url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_structured(&self, page: u32) -> Result<Option<FetchResult>> {
        let url = self.page_url(page);
        let config = RequestConfig::new()
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .header("Accept", "application/json");

        let body = self.client.get_text(url.as_str(), config).await?;
        trace!(page, bytes = body.len(), "structured body received");
        FetchResult::from_body(&body)
    }

    async fn fetch_markup(&self, page: u32) -> Result<Option<String>> {
        let url = self.page_url(page);
        let config = RequestConfig::new()
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .header("Accept", "text/html");

        let body = self.client.get_text(url.as_str(), config).await?;
        trace!(page, bytes = body.len(), "markup body received");
        if body.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(body))
        }
    }
}
