//! Access to the external article search API.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the collector never talks to the
//! network directly:
//! - [`ArticleSource`]: Core trait returning one page of articles per request
//! - [`PageRequest`]: A fully-built request (endpoint, query, timeout)
//! - [`NewsApiClient`]: The `reqwest` implementation used in production
//!
//! Implementations report failures as errors. Turning a failed page into an
//! empty one is the collector's job, not the source's.

use crate::models::{Article, ArticlesResponse};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Trait for fetching a single page of articles.
pub trait ArticleSource {
    /// Issue one request and return the articles it yielded, in upstream order.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Article>, Box<dyn Error>>;
}

/// One upstream request, ready to send.
#[derive(Clone, PartialEq)]
pub struct PageRequest {
    pub endpoint: Url,
    /// Query parameters in insertion order. Contains the API key.
    pub params: Vec<(&'static str, String)>,
    pub timeout: Option<Duration>,
}

impl PageRequest {
    /// Look up a query parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The explicit page number, if this request carries one.
    pub fn page(&self) -> Option<u32> {
        self.param("page").and_then(|p| p.parse().ok())
    }
}

impl fmt::Debug for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| {
                if *k == "apiKey" {
                    (*k, "<redacted>")
                } else {
                    (*k, v.as_str())
                }
            })
            .collect();
        f.debug_struct("PageRequest")
            .field("endpoint", &self.endpoint.as_str())
            .field("params", &params)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the news search API.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
}

impl NewsApiClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl ArticleSource for NewsApiClient {
    #[instrument(level = "debug", skip_all, fields(endpoint = %request.endpoint, page = ?request.page()))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Article>, Box<dyn Error>> {
        let t0 = Instant::now();
        let mut builder = self
            .http
            .get(request.endpoint.clone())
            .query(&request.params);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        // Strip the URL from errors: its query string carries the API key.
        let res = async {
            let response = builder.send().await?.error_for_status()?;
            response.json::<ArticlesResponse>().await
        }
        .await
        .map_err(|e| e.without_url());
        let dt = t0.elapsed();

        match res {
            Ok(payload) => {
                let status = payload.status.clone();
                let total_results = payload.totalResults;
                let (articles, skipped) = payload.into_articles();
                if skipped > 0 {
                    warn!(skipped, "Dropped non-object entries from page");
                }
                debug!(
                    elapsed_ms = dt.as_millis(),
                    count = articles.len(),
                    status = ?status,
                    total_results = ?total_results,
                    "Fetched page"
                );
                Ok(articles)
            }
            Err(e) => {
                warn!(elapsed_ms = dt.as_millis(), error = %e, "API call failed");
                Err(Box::new(e))
            }
        }
    }
}
