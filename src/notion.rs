//! Page gateway for the Notion API.
//!
//! Creates a child page under the configured parent and appends rendered
//! blocks to it, at most [`crate::render::blocks::MAX_BLOCKS_PER_REQUEST`] per
//! call and in document order.

use crate::api;
use crate::config::NotionConfig;
use crate::error::{NewsError, Result, Service};
use crate::render::blocks::{Block, RenderedDocument, TextRun, plain_runs};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Production base URL of the pages API.
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// A created page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub id: String,
    pub url: String,
}

/// HTTP client for the pages API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
    api_key: String,
    parent_page_id: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig, timeout_secs: u64) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(NOTION_API_BASE)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client: api::build_client(timeout_secs)?,
            base_url,
            api_key: config.api_key.clone(),
            parent_page_id: config.parent_page_id.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Create an empty page titled `title` under the parent page.
    ///
    /// Long titles are sent as several rich-text runs, so nothing is cut.
    #[instrument(level = "info", skip_all, fields(%title))]
    pub async fn create_page(&self, title: &str) -> Result<PageRef> {
        let title_runs: Vec<_> = plain_runs(title).iter().map(TextRun::to_json).collect();
        let body = json!({
            "parent": { "page_id": self.parent_page_id },
            "properties": {
                "title": { "title": title_runs }
            }
        });

        let request = self
            .authorized(self.client.post(format!("{}/pages", self.base_url)))
            .json(&body);
        let response = api::send(Service::Pages, request).await?;
        let page: PageRef = api::read_json(Service::Pages, response).await?;

        info!(page_id = %page.id, "Created page");
        Ok(page)
    }

    /// Append a rendered document to a page.
    ///
    /// # Arguments
    ///
    /// * `page_id` - Id of the page to append to, as returned by [`Self::create_page`]
    /// * `document` - Blocks to append; sent in [`RenderedDocument::batches`] order
    ///
    /// # Returns
    ///
    /// The number of append requests sent. An empty document sends none.
    ///
    /// # Errors
    ///
    /// The first failing batch ends the call. Batches already sent stay on the page.
    #[instrument(level = "info", skip_all, fields(%page_id, blocks = document.blocks.len()))]
    pub async fn append_blocks(
        &self,
        page_id: &str,
        document: &RenderedDocument,
    ) -> Result<usize> {
        if page_id.trim().is_empty() {
            return Err(NewsError::InvalidRequest(
                "page id must not be empty".to_string(),
            ));
        }
        let url = format!(
            "{}/blocks/{}/children",
            self.base_url,
            urlencoding::encode(page_id)
        );

        let mut sent = 0;
        for (batch_no, batch) in document.batches().enumerate() {
            let children: Vec<_> = batch.iter().map(Block::to_json).collect();
            let request = self
                .authorized(self.client.patch(&url))
                .json(&json!({ "children": children }));
            api::send(Service::Pages, request).await?;
            sent += 1;
            debug!(batch_no, size = batch.len(), "Appended block batch");
        }

        info!(requests = sent, "Appended blocks");
        Ok(sent)
    }

    /// Create a page and fill it with a rendered document.
    pub async fn publish(&self, title: &str, document: &RenderedDocument) -> Result<PageRef> {
        let page = self.create_page(title).await?;
        self.append_blocks(&page.id, document).await?;
        Ok(page)
    }
}
