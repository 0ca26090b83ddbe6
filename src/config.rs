//! Application configuration loaded from `config.yaml`.
//!
//! # Example
//!
//! ```yaml
//! naver:
//!   client_id: "..."
//!   client_secret: "..."
//! notion:
//!   api_key: "secret_..."
//!   parent_page_id: "..."
//! news:
//!   categories: ["AI", "경제"]
//!   count_per_category: 5
//!   only_korean: true
//!   blacklist_domains: ["example-spam.com"]
//! ```
//!
//! Credentials can be left out of the file and supplied through the
//! environment instead (see [`crate::cli::Cli`]). Validation runs after those
//! overrides are applied.

use crate::aggregator::DEFAULT_OVER_FETCH_BUFFER;
use crate::api::DEFAULT_TIMEOUT_SECS;
use crate::error::{NewsError, Result};
use crate::models::{MAX_PAGE_SIZE, SearchFilters};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NaverConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Overrides the search endpoint, mainly for proxies and tests.
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub parent_page_id: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub categories: Vec<String>,
    pub count_per_category: u32,
    #[serde(default = "default_only_korean")]
    pub only_korean: bool,
    #[serde(default)]
    pub whitelist_domains: Vec<String>,
    #[serde(default)]
    pub blacklist_domains: Vec<String>,
    #[serde(default)]
    pub skip_notices: bool,
    /// Extra items requested per page beyond the category quota.
    #[serde(default = "default_over_fetch_buffer")]
    pub over_fetch_buffer: u32,
}

impl NewsConfig {
    /// Filters for a run, with the language filter decided by the caller.
    pub fn filters(&self, only_korean: bool) -> SearchFilters {
        SearchFilters {
            only_korean,
            whitelist_domains: self.whitelist_domains.clone(),
            blacklist_domains: self.blacklist_domains.clone(),
            skip_notices: self.skip_notices,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub naver: NaverConfig,
    #[serde(default)]
    pub notion: NotionConfig,
    pub news: NewsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_only_korean() -> bool {
    true
}

fn default_over_fetch_buffer() -> u32 {
    DEFAULT_OVER_FETCH_BUFFER
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Credential values taken from the command line or environment.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub notion_api_key: Option<String>,
    pub notion_parent_page_id: Option<String>,
}

impl AppConfig {
    /// Parse a configuration document without validating it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| NewsError::Config(format!("invalid config: {e}")))
    }

    /// Read and parse the configuration file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let yaml = match tokio::fs::read_to_string(path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NewsError::Config(format!(
                    "{} not found. Copy config.example.yaml to {} and fill in your credentials.",
                    path.display(),
                    path.display()
                )));
            }
            Err(e) => {
                return Err(NewsError::Config(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        let config = Self::from_yaml(&yaml)?;
        info!(
            categories = config.news.categories.len(),
            count_per_category = config.news.count_per_category,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Replace credentials with any values given on the command line.
    pub fn apply_overrides(&mut self, overrides: CredentialOverrides) {
        if let Some(v) = overrides.naver_client_id {
            self.naver.client_id = v;
        }
        if let Some(v) = overrides.naver_client_secret {
            self.naver.client_secret = v;
        }
        if let Some(v) = overrides.notion_api_key {
            self.notion.api_key = v;
        }
        if let Some(v) = overrides.notion_parent_page_id {
            self.notion.parent_page_id = v;
        }
    }

    /// Check that every required value is present and in range.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("naver.client_id", &self.naver.client_id),
            ("naver.client_secret", &self.naver.client_secret),
            ("notion.api_key", &self.notion.api_key),
            ("notion.parent_page_id", &self.notion.parent_page_id),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(NewsError::Config(format!("{name} is required")));
        }

        if self.news.categories.is_empty() {
            return Err(NewsError::Config(
                "news.categories must be a non-empty array of strings".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.news.count_per_category) {
            return Err(NewsError::Config(format!(
                "news.count_per_category must be a number between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(NewsError::Config(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
