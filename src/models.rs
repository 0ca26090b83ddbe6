//! Data models for search results, aggregated categories and run requests.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: One news item as returned by the search API
//! - [`SearchMeta`] / [`SearchPage`]: One page of search results
//! - [`CategoryResult`]: The final, trimmed article list of one category
//! - [`AggregationRequest`] and [`SearchFilters`]: What a run should collect
//!
//! Field names follow the search API's JSON (`pubDate`, `lastBuildDate`) so the
//! results can be printed and read back without translation.

use crate::error::{NewsError, Result};
use serde::{Deserialize, Serialize};

/// Largest page size the search API accepts, and the largest per-category count.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A single news article.
///
/// `link` is the identity used for deduplication. `originallink` points to the
/// publisher's own URL and is dropped once it turns out to equal `link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originallink: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
}

impl Article {
    /// The URL domain filters are matched against: the publisher link when
    /// there is one, otherwise the aggregator link.
    pub fn source_link(&self) -> &str {
        match self.originallink.as_deref() {
            Some(original) if !original.is_empty() => original,
            _ => &self.link,
        }
    }
}

/// Page metadata reported by the search API. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMeta {
    #[serde(rename = "lastBuildDate", default)]
    pub last_build_date: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub display: u32,
}

/// One fetched page of filtered articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub meta: SearchMeta,
    pub articles: Vec<Article>,
}

/// The articles collected for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub articles: Vec<Article>,
}

/// Post-fetch content filters, applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Keep only articles with Hangul in the title or description.
    pub only_korean: bool,
    /// Keep only articles whose source link contains one of these substrings.
    pub whitelist_domains: Vec<String>,
    /// Drop articles whose source link contains one of these substrings.
    pub blacklist_domains: Vec<String>,
    /// Drop articles whose title starts with a bracketed tag such as `[알림]`.
    pub skip_notices: bool,
}

/// Everything one aggregation run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub categories: Vec<String>,
    pub count_per_category: u32,
    pub filters: SearchFilters,
}

impl AggregationRequest {
    /// Check the request shape before any remote call is made.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(NewsError::InvalidRequest(
                "categories must be a non-empty array".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.count_per_category) {
            return Err(NewsError::InvalidRequest(format!(
                "count_per_category must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.count_per_category
            )));
        }
        Ok(())
    }
}
