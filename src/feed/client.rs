//! HTTP side of a search: query URL construction, fetch, error mapping.

use anyhow::Context;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::entities::{Post, Query};
use crate::feed::parser::{parse_feed, FeedError};

/// Endpoint queried when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://search.twitter.com/search.atom";

/// Fixed result page size; the endpoint template takes no other parameters.
pub const RESULTS_PER_PAGE: u32 = 100;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while running a search.
///
/// Transport and document-level failures are fatal and surface here; field
/// defects inside individual entries are absorbed by the parser.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network-level error (DNS, connection, TLS, canceled stream)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured deadline
    #[error("request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("response too large")]
    ResponseTooLarge,
    /// Feed XML could not be parsed, propagated verbatim from the parser
    #[error(transparent)]
    Parse(#[from] FeedError),
}

/// Client for a feed-style search endpoint.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection
/// pool across clones. Each `search` call owns its response and releases
/// the connection on every exit path.
#[derive(Clone, Debug)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchClient {
    /// Client pointing at [`DEFAULT_ENDPOINT`] with the default deadline.
    pub fn new() -> Self {
        Self::with_endpoint(Url::parse(DEFAULT_ENDPOINT).expect("default endpoint URL is valid"))
    }

    /// Client pointing at a custom endpoint.
    pub fn with_endpoint(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the request deadline (default 30 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a client from configuration: endpoint, deadline, user agent.
    ///
    /// # Errors
    ///
    /// Fails if the configured endpoint is not a valid URL or the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let endpoint = config.endpoint_url().context("invalid search endpoint")?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Builds the request URL for a keyword: `<endpoint>?q=<encoded>&rpp=100`.
    ///
    /// An empty keyword still produces a valid URL (`q=&rpp=100`).
    pub fn request_url(&self, keyword: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", keyword)
            .append_pair("rpp", &RESULTS_PER_PAGE.to_string());
        url
    }

    /// Runs a search and returns the parsed posts in document order.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Network`] - DNS, connection, or TLS failure, or a
    ///   stream canceled mid-download
    /// - [`SearchError::Timeout`] - the deadline elapsed
    /// - [`SearchError::HttpStatus`] - non-2xx response
    /// - [`SearchError::ResponseTooLarge`] - body over the 10MB cap
    /// - [`SearchError::Parse`] - the body is not well-formed feed XML
    ///
    /// There is no retry logic here; retrying is the caller's decision.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Post>, SearchError> {
        let url = self.request_url(keyword);

        let response = tokio::time::timeout(self.timeout, self.http.get(url.clone()).send())
            .await
            .map_err(|_| SearchError::Timeout)?
            .map_err(SearchError::Network)?;

        if !response.status().is_success() {
            return Err(SearchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        let posts = parse_feed(&bytes)?;

        tracing::debug!(query = keyword, url = %url, posts = posts.len(), "search completed");
        Ok(posts)
    }

    /// Runs the search for a query's keyword.
    ///
    /// Does not touch the query's own result list; replacing that list is
    /// [`Query::reload`]'s job, keeping this a pure keyword-to-posts call.
    pub async fn search_query(&self, query: &Query) -> Result<Vec<Post>, SearchError> {
        self.search(query.keyword()).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SearchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(SearchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(SearchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SearchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
