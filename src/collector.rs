//! Category collection against the paginated search API.
//!
//! For every configured category the [`Collector`] issues a bounded sequence of
//! page requests, concatenates the articles in upstream order, and persists the
//! resulting [`CategoryBatch`] through [`outputs::json`](crate::outputs::json).
//!
//! # Pagination
//!
//! | Mode | Page parameter | Stops early | Timeout |
//! |------|----------------|-------------|---------|
//! | Headlines | none (identical requests repeat) | never | none |
//! | Search | explicit, 1-based | first empty page | 30s by default |
//!
//! The headline endpoint exposes no page numbers, so headline mode repeats the
//! same request `max_pages` times and may collect duplicates. That is a known
//! limitation of the endpoint and is kept as-is.
//!
//! # Failures
//!
//! A failed request (transport, HTTP status, undecodable body) counts as a page
//! with zero articles. It is logged and never propagated. In search mode that
//! empty page also ends pagination for the category. There are no retries.

use crate::api::{ArticleSource, PageRequest};
use crate::config::CollectorConfig;
use crate::error::Result;
use crate::models::{Article, Category, CategoryBatch, CollectionMode};
use crate::outputs::json;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct Collector<S> {
    source: S,
    config: CollectorConfig,
}

impl<S> Collector<S>
where
    S: ArticleSource,
{
    pub fn new(source: S, config: CollectorConfig) -> Self {
        Self { source, config }
    }

    /// Build the request for `category` on 1-based `page`.
    ///
    /// In headline mode `page` is ignored and every call yields the same request.
    pub fn build_request(&self, category: Category, page: u32) -> PageRequest {
        let c = &self.config;
        let mut params: Vec<(&'static str, String)> = Vec::with_capacity(8);

        match c.mode {
            CollectionMode::Headlines => {
                params.push(("country", c.country.clone()));
                params.push(("pageSize", c.page_size.to_string()));
                params.push(("category", category.to_string()));
            }
            CollectionMode::Search => {
                params.push(("q", category.to_string()));
                if let Some(from) = c.from {
                    params.push(("from", from.format("%Y-%m-%d").to_string()));
                }
                if let Some(to) = c.to {
                    params.push(("to", to.format("%Y-%m-%d").to_string()));
                }
                params.push(("language", c.language.clone()));
                params.push(("sortBy", c.sort_by.clone()));
                params.push(("pageSize", c.page_size.to_string()));
                params.push(("page", page.to_string()));
            }
        }
        params.push(("apiKey", c.api_key.clone()));

        PageRequest {
            endpoint: c.endpoint.clone(),
            params,
            timeout: c.timeout,
        }
    }

    /// Collect every page for one category.
    ///
    /// Issues at most `max_pages` requests. The batch holds the articles of all
    /// pages in the order they arrived.
    #[instrument(level = "info", skip(self), fields(mode = ?self.config.mode))]
    pub async fn collect_category(
        &self,
        category: Category,
        collected_on: NaiveDate,
    ) -> CategoryBatch {
        let c = &self.config;
        let mut articles: Vec<Article> = Vec::new();

        for page in 1..=c.max_pages {
            match c.mode {
                CollectionMode::Headlines => info!(
                    %category,
                    page,
                    page_size = c.page_size,
                    "Fetching {} articles for category '{}'",
                    c.page_size,
                    category
                ),
                CollectionMode::Search => info!(
                    %category,
                    page,
                    page_size = c.page_size,
                    from = ?c.from,
                    to = ?c.to,
                    "Fetching page {} of {} articles for topic '{}'",
                    page,
                    c.page_size,
                    category
                ),
            }

            let request = self.build_request(category, page);
            let fetched = self.fetch_page_or_empty(category, page, &request).await;

            if fetched.is_empty() && c.mode == CollectionMode::Search {
                info!(%category, page, "No more results; stopping pagination");
                break;
            }
            articles.extend(fetched);
        }

        CategoryBatch {
            category,
            collected_on,
            articles,
        }
    }

    /// Fetch one page, degrading any failure to zero articles.
    async fn fetch_page_or_empty(
        &self,
        category: Category,
        page: u32,
        request: &PageRequest,
    ) -> Vec<Article> {
        match self.source.fetch_page(request).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(%category, page, error = %e, "Page fetch failed; treating as empty");
                Vec::new()
            }
        }
    }

    /// Collect and persist every configured category, sequentially.
    ///
    /// Returns the written file paths in category order. Only a failure to write
    /// a batch file is propagated.
    #[instrument(level = "info", skip_all, fields(categories = self.config.categories.len()))]
    pub async fn run(&self, collected_on: NaiveDate) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.config.categories.len());
        for &category in &self.config.categories {
            let batch = self.collect_category(category, collected_on).await;
            let path = json::write_batch(&batch, &self.config.raw_dir).await?;
            info!(
                %category,
                count = batch.articles.len(),
                "Saved {} articles to {}",
                batch.articles.len(),
                path.display()
            );
            written.push(path);
        }
        Ok(written)
    }
}
