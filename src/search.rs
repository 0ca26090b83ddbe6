//! News search gateway.
//!
//! Queries the Naver news search API for one category and one page window,
//! cleans the returned text fields and applies the post-fetch content filters.
//!
//! # Architecture
//!
//! - [`SearchNews`]: the seam the aggregator drives, so it can be exercised
//!   against an in-memory fake
//! - [`NaverClient`]: the HTTP implementation
//! - Pure helpers ([`sanitize_category`], [`strip_markup`], [`apply_filters`])
//!   hold the text rules and are tested on their own
//!
//! # Filter order
//!
//! 1. Language (Hangul in title or description), when enabled
//! 2. Domain whitelist, when non-empty
//! 3. Domain blacklist, when non-empty
//! 4. Leading-bracket notices (`[알림] ...`), when enabled
//!
//! The filtered list is truncated to the requested page size last.

use crate::api;
use crate::config::NaverConfig;
use crate::error::{NewsError, Result, Service};
use crate::models::{Article, MAX_PAGE_SIZE, SearchFilters, SearchMeta, SearchPage};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// Production endpoint of the news search API.
pub const NAVER_NEWS_URL: &str = "https://openapi.naver.com/v1/search/news.json";

/// Highest `start` offset the search API accepts.
pub const MAX_START: u32 = 1000;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(?:[a-zA-Z]+|#39);").unwrap());
static QUERY_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s가-힣ㄱ-ㅎㅏ-ㅣ\-]").unwrap());
static HANGUL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[가-힣ㄱ-ㅎㅏ-ㅣ]").unwrap());
static LEADING_NOTICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[[^\]]*\]").unwrap());

/// Search one category, one page window at a time.
pub trait SearchNews {
    /// Fetch up to `page_size` filtered articles starting at the 1-based `start` offset.
    async fn search(
        &self,
        category: &str,
        page_size: u32,
        start: u32,
        filters: &SearchFilters,
    ) -> Result<SearchPage>;
}

/// Reduce a category to characters that are safe in a query string.
///
/// Keeps ASCII word characters, Hangul, whitespace and hyphens.
pub fn sanitize_category(category: &str) -> String {
    QUERY_DISALLOWED
        .replace_all(category.trim(), "")
        .trim()
        .to_string()
}

/// Remove markup tags and decode the fixed entity table.
///
/// Unknown entities are left as they are.
pub fn strip_markup(text: &str) -> String {
    let without_tags = MARKUP_TAG.replace_all(text, "");
    ENTITY
        .replace_all(&without_tags, |caps: &Captures| {
            match &caps[0] {
                "&amp;" => "&",
                "&lt;" => "<",
                "&gt;" => ">",
                "&quot;" => "\"",
                "&#39;" | "&apos;" => "'",
                other => other,
            }
            .to_string()
        })
        .into_owned()
}

/// Whether `text` contains any Hangul syllable or jamo.
pub fn contains_hangul(text: &str) -> bool {
    HANGUL.is_match(text)
}

/// Whether a title opens with a bracketed tag such as `[알림]` or `[공고]`.
pub fn is_bracket_notice(title: &str) -> bool {
    LEADING_NOTICE.is_match(title)
}

/// Apply the content filters in their fixed order.
pub fn apply_filters(articles: Vec<Article>, filters: &SearchFilters) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| {
            !filters.only_korean || contains_hangul(&a.title) || contains_hangul(&a.description)
        })
        .filter(|a| {
            filters.whitelist_domains.is_empty()
                || filters
                    .whitelist_domains
                    .iter()
                    .any(|domain| a.source_link().contains(domain.as_str()))
        })
        .filter(|a| {
            !filters
                .blacklist_domains
                .iter()
                .any(|domain| a.source_link().contains(domain.as_str()))
        })
        .filter(|a| !filters.skip_notices || !is_bracket_notice(&a.title))
        .collect()
}

/// Wire format of a search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "lastBuildDate", default)]
    last_build_date: String,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    start: u32,
    #[serde(default)]
    display: u32,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    originallink: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(rename = "pubDate", default)]
    pub_date: String,
}

impl From<SearchItem> for Article {
    fn from(item: SearchItem) -> Self {
        Self {
            title: strip_markup(&item.title),
            link: item.link,
            originallink: item.originallink.filter(|o| !o.is_empty()),
            description: strip_markup(&item.description),
            pub_date: item.pub_date,
        }
    }
}

/// HTTP client for the news search API.
#[derive(Debug, Clone)]
pub struct NaverClient {
    client: Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
}

impl NaverClient {
    pub fn new(config: &NaverConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: api::build_client(timeout_secs)?,
            endpoint: config
                .base_url
                .clone()
                .unwrap_or_else(|| NAVER_NEWS_URL.to_string()),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    fn search_url(&self, query: &str, display: u32, start: u32) -> Result<Url> {
        let display = display.to_string();
        let start = start.to_string();
        Url::parse_with_params(
            &self.endpoint,
            [
                ("query", query),
                ("display", display.as_str()),
                ("start", start.as_str()),
                ("sort", "date"),
            ],
        )
        .map_err(|e| NewsError::Config(format!("invalid search endpoint {}: {e}", self.endpoint)))
    }
}

impl SearchNews for NaverClient {
    /// Run one search request and filter its items.
    ///
    /// # Arguments
    ///
    /// * `category` - Free-text category, sanitized into the `query` parameter
    /// * `page_size` - Requested `display`; clamped to [`MAX_PAGE_SIZE`]
    /// * `start` - 1-based offset; clamped to `1..=`[`MAX_START`]
    /// * `filters` - Post-fetch filters, applied in the order listed in the module docs
    ///
    /// # Returns
    ///
    /// The page metadata and at most `page_size` filtered articles with markup
    /// removed. Fewer articles than requested may come back even when more
    /// results exist, because filtering runs after the fetch.
    ///
    /// # Errors
    ///
    /// * [`NewsError::InvalidQuery`] if nothing is left after sanitizing
    /// * [`NewsError::InvalidRequest`] if `page_size` is 0
    /// * Auth, rate-limit, network and remote errors from the API call
    #[instrument(level = "info", skip_all, fields(%category, page_size, start))]
    async fn search(
        &self,
        category: &str,
        page_size: u32,
        start: u32,
        filters: &SearchFilters,
    ) -> Result<SearchPage> {
        let query = sanitize_category(category);
        if query.is_empty() {
            return Err(NewsError::InvalidQuery(category.to_string()));
        }
        if page_size == 0 {
            return Err(NewsError::InvalidRequest(
                "page size must be at least 1".to_string(),
            ));
        }

        let display = page_size.min(MAX_PAGE_SIZE);
        let start = start.clamp(1, MAX_START);
        let url = self.search_url(&query, display, start)?;

        let request = self
            .client
            .get(url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret);
        let response = api::send(Service::Search, request).await?;
        let data: SearchResponse = api::read_json(Service::Search, response).await?;

        let fetched = data.items.len();
        let mut articles = apply_filters(
            data.items.into_iter().map(Article::from).collect(),
            filters,
        );
        articles.truncate(display as usize);

        debug!(
            fetched,
            kept = articles.len(),
            total = data.total,
            "Search page filtered"
        );

        Ok(SearchPage {
            meta: SearchMeta {
                last_build_date: data.last_build_date,
                total: data.total,
                start: data.start,
                display: data.display,
            },
            articles,
        })
    }
}
