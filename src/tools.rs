//! Tool-level operations behind the command-line entry points.
//!
//! - [`fetch_news`]: aggregate articles for a list of categories
//! - [`publish_page`]: render content and publish it as a new page
//! - [`news_to_page`]: both, in one run
//!
//! Each operation is all-or-nothing: the first error ends it and nothing
//! partial is returned.

use crate::aggregator::Aggregator;
use crate::config::NewsConfig;
use crate::error::{NewsError, Result};
use crate::models::{AggregationRequest, CategoryResult};
use crate::notion::NotionClient;
use crate::render::template::Template;
use crate::render::{render, render_markdown};
use crate::search::SearchNews;
use crate::utils::{default_page_title, local_today};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Aggregation input. Absent fields fall back to the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchNewsInput {
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default, alias = "count_per_category")]
    pub count_per_category: Option<u32>,
    #[serde(default, rename = "onlyKoreanLanguage", alias = "only_korean")]
    pub only_korean: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchNewsOutput {
    pub results: Vec<CategoryResult>,
}

/// What a published page is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Aggregated results, rendered through a template.
    Categories(Vec<CategoryResult>),
    /// Markdown-like text, translated line by line.
    Markdown(String),
}

impl PageContent {
    /// Interpret raw input: a `{"results": [...]}` document becomes
    /// [`PageContent::Categories`], anything else is markdown.
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<FetchNewsOutput>(text) {
            Ok(output) => PageContent::Categories(output.results),
            Err(_) => PageContent::Markdown(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPageInput {
    pub title: String,
    pub content: PageContent,
    pub template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPageOutput {
    pub page_url: String,
    pub page_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsToPageInput {
    pub fetch: FetchNewsInput,
    pub title: Option<String>,
    pub template: Option<String>,
}

/// Aggregate the requested categories.
#[instrument(level = "info", skip_all)]
pub async fn fetch_news<S: SearchNews>(
    search: &S,
    input: FetchNewsInput,
    config: &NewsConfig,
) -> Result<FetchNewsOutput> {
    let request = AggregationRequest {
        categories: input
            .categories
            .unwrap_or_else(|| config.categories.clone()),
        count_per_category: input
            .count_per_category
            .unwrap_or(config.count_per_category),
        filters: config.filters(input.only_korean.unwrap_or(config.only_korean)),
    };

    let results = Aggregator::new(search, config.over_fetch_buffer)
        .aggregate(&request)
        .await?;
    Ok(FetchNewsOutput { results })
}

/// Render `input.content` and publish it under `input.title`.
#[instrument(level = "info", skip_all)]
pub async fn publish_page(
    notion: &NotionClient,
    input: PublishPageInput,
) -> Result<PublishPageOutput> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(NewsError::InvalidRequest(
            "title must be a non-empty string".to_string(),
        ));
    }

    let document = match &input.content {
        PageContent::Markdown(text) if text.trim().is_empty() => {
            return Err(NewsError::InvalidRequest(
                "content must be a non-empty string".to_string(),
            ));
        }
        PageContent::Markdown(text) => render_markdown(text),
        PageContent::Categories(results) if results.is_empty() => {
            return Err(NewsError::InvalidRequest(
                "category results must be a non-empty array".to_string(),
            ));
        }
        PageContent::Categories(results) => {
            render(results, Template::from_name(input.template.as_deref()))
        }
    };

    let page = notion.publish(title, &document).await?;
    info!(page_url = %page.url, blocks = document.blocks.len(), "Published page");
    Ok(PublishPageOutput {
        page_url: page.url,
        page_id: page.id,
    })
}

/// Aggregate, then publish the results as one page.
pub async fn news_to_page<S: SearchNews>(
    search: &S,
    notion: &NotionClient,
    input: NewsToPageInput,
    config: &NewsConfig,
) -> Result<PublishPageOutput> {
    let FetchNewsOutput { results } = fetch_news(search, input.fetch, config).await?;

    let title = input
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_page_title(local_today()));

    publish_page(
        notion,
        PublishPageInput {
            title,
            content: PageContent::Categories(results),
            template: input.template,
        },
    )
    .await
}
