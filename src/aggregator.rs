//! Cross-category news aggregation.
//!
//! For each requested category, in input order, the [`Aggregator`] pages
//! through the search gateway until one of three things happens:
//!
//! | State | Trigger |
//! |-------|---------|
//! | [`PageState::QuotaMet`] | the category holds `count_per_category` unseen articles |
//! | [`PageState::Exhausted`] | a page came back with fewer articles than requested |
//! | [`PageState::CeilingReached`] | the next `start` offset would pass the API's 1000 limit |
//!
//! Uniqueness is tracked with one set of seen links per [`Aggregator::aggregate`]
//! call, shared by every category of that run. A link emitted for an earlier
//! category is dropped when it shows up again later; no replacement fetch is
//! made for it beyond the normal pagination. Articles past the quota on an
//! over-full page are discarded and stay unseen.
//!
//! Pages are fetched strictly one after another, because each fetch decision
//! depends on the seen set as left by the previous page.

use crate::error::Result;
use crate::models::{AggregationRequest, Article, CategoryResult, MAX_PAGE_SIZE, SearchFilters};
use crate::normalize::normalize;
use crate::search::{MAX_START, SearchNews};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Extra items requested per page to absorb filter and dedup losses.
pub const DEFAULT_OVER_FETCH_BUFFER: u32 = 10;

/// Where the pagination loop of one category stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Fetching,
    QuotaMet,
    Exhausted,
    CeilingReached,
}

impl PageState {
    /// Decide the next state after a page has been merged into the category.
    ///
    /// * `collected` - unique articles the category holds now
    /// * `returned` - articles the page came back with
    /// * `requested` - page size that was asked for
    /// * `next_start` - offset the following page would use
    pub fn after_page(
        collected: usize,
        quota: usize,
        returned: usize,
        requested: usize,
        next_start: u32,
    ) -> Self {
        if collected >= quota {
            PageState::QuotaMet
        } else if returned < requested {
            PageState::Exhausted
        } else if next_start > MAX_START {
            PageState::CeilingReached
        } else {
            PageState::Fetching
        }
    }
}

/// The outcome of paginating a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRun {
    pub articles: Vec<Article>,
    pub state: PageState,
    pub pages: u32,
}

/// Drives a [`SearchNews`] implementation across categories and pages.
#[derive(Debug)]
pub struct Aggregator<'a, S> {
    search: &'a S,
    over_fetch_buffer: u32,
}

impl<'a, S: SearchNews> Aggregator<'a, S> {
    pub fn new(search: &'a S, over_fetch_buffer: u32) -> Self {
        Self {
            search,
            over_fetch_buffer,
        }
    }

    /// Page size requested for a category quota.
    pub fn page_size(&self, quota: u32) -> u32 {
        quota.saturating_add(self.over_fetch_buffer).min(MAX_PAGE_SIZE)
    }

    /// Collect, normalize and trim articles for every category of `request`.
    ///
    /// Categories are processed in input order and share one set of seen
    /// links, so no link appears under two categories.
    ///
    /// # Arguments
    ///
    /// * `request` - Categories, per-category quota and content filters
    ///
    /// # Returns
    ///
    /// One [`CategoryResult`] per requested category, in request order, each
    /// holding at most `count_per_category` normalized articles. A category
    /// with no matches yields an empty list.
    ///
    /// # Errors
    ///
    /// [`crate::error::NewsError::InvalidRequest`] when the request shape is
    /// invalid, before any search is made. Otherwise the first failing search
    /// aborts the whole run and no partial result is returned.
    #[instrument(
        level = "info",
        skip_all,
        fields(categories = request.categories.len(), count = request.count_per_category)
    )]
    pub async fn aggregate(&self, request: &AggregationRequest) -> Result<Vec<CategoryResult>> {
        request.validate()?;

        let quota = request.count_per_category as usize;
        let mut seen_links = HashSet::new();
        let mut results = Vec::with_capacity(request.categories.len());

        for category in &request.categories {
            let run = self
                .collect_category(
                    category,
                    request.count_per_category,
                    &request.filters,
                    &mut seen_links,
                )
                .await?;

            let mut articles: Vec<Article> = run.articles.into_iter().map(normalize).collect();
            articles.truncate(quota);

            info!(
                %category,
                collected = articles.len(),
                pages = run.pages,
                state = ?run.state,
                "Category aggregated"
            );
            results.push(CategoryResult {
                category: category.clone(),
                articles,
            });
        }

        Ok(results)
    }

    /// Page through one category, recording every emitted link in `seen_links`.
    pub async fn collect_category(
        &self,
        category: &str,
        quota: u32,
        filters: &SearchFilters,
        seen_links: &mut HashSet<String>,
    ) -> Result<CategoryRun> {
        let page_size = self.page_size(quota);
        let quota = quota as usize;
        let mut unique = Vec::with_capacity(quota);
        let mut start = 1u32;
        let mut pages = 0u32;
        let mut state = PageState::Fetching;

        while state == PageState::Fetching {
            let page = self.search.search(category, page_size, start, filters).await?;
            pages += 1;

            let returned = page.articles.len();
            let total = page.meta.total;
            let mut duplicates = 0usize;
            for article in page.articles {
                if unique.len() >= quota {
                    break;
                }
                if seen_links.insert(article.link.clone()) {
                    unique.push(article);
                } else {
                    duplicates += 1;
                }
            }
            debug!(
                %category,
                start,
                total,
                returned,
                duplicates,
                collected = unique.len(),
                "Merged page"
            );

            start = start.saturating_add(page_size);
            state = PageState::after_page(unique.len(), quota, returned, page_size as usize, start);
        }

        Ok(CategoryRun {
            articles: unique,
            state,
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NewsError, Service};
    use crate::models::SearchPage;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn article(n: u32) -> Article {
        Article {
            title: format!("Article {n}"),
            link: format!("https://example.com/{n}"),
            originallink: Some(format!("https://example.com/{n}")),
            description: "Test description".to_string(),
            pub_date: "Mon, 23 Feb 2026 10:00:00 +0900".to_string(),
        }
    }

    fn articles(range: std::ops::RangeInclusive<u32>) -> Vec<Article> {
        range.map(article).collect()
    }

    /// Serves canned pages keyed by `(category, start)`, falling back to
    /// `default_page` for any other window.
    #[derive(Default)]
    struct ScriptedSearch {
        pages: HashMap<(String, u32), Vec<Article>>,
        default_page: Vec<Article>,
        failing_category: Option<String>,
        calls: RefCell<Vec<(String, u32, u32)>>,
    }

    impl ScriptedSearch {
        fn page(mut self, category: &str, start: u32, articles: Vec<Article>) -> Self {
            self.pages.insert((category.to_string(), start), articles);
            self
        }

        fn calls(&self) -> Vec<(String, u32, u32)> {
            self.calls.borrow().clone()
        }
    }

    impl SearchNews for ScriptedSearch {
        async fn search(
            &self,
            category: &str,
            page_size: u32,
            start: u32,
            _filters: &SearchFilters,
        ) -> Result<SearchPage> {
            self.calls
                .borrow_mut()
                .push((category.to_string(), page_size, start));
            if self.failing_category.as_deref() == Some(category) {
                return Err(NewsError::RateLimited {
                    service: Service::Search,
                });
            }
            let mut articles = self
                .pages
                .get(&(category.to_string(), start))
                .cloned()
                .unwrap_or_else(|| self.default_page.clone());
            articles.truncate(page_size as usize);
            Ok(SearchPage {
                articles,
                ..Default::default()
            })
        }
    }

    fn request(categories: &[&str], count: u32) -> AggregationRequest {
        AggregationRequest {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            count_per_category: count,
            filters: SearchFilters::default(),
        }
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(PageState::after_page(3, 3, 3, 3, 4), PageState::QuotaMet);
        assert_eq!(PageState::after_page(1, 3, 2, 3, 4), PageState::Exhausted);
        assert_eq!(PageState::after_page(1, 3, 3, 3, 1001), PageState::CeilingReached);
        assert_eq!(PageState::after_page(1, 3, 3, 3, 1000), PageState::Fetching);
        // A met quota wins over a short page.
        assert_eq!(PageState::after_page(3, 3, 0, 13, 14), PageState::QuotaMet);
    }

    #[test]
    fn test_page_size_includes_buffer_and_caps_at_100() {
        let search = ScriptedSearch::default();
        let aggregator = Aggregator::new(&search, DEFAULT_OVER_FETCH_BUFFER);
        assert_eq!(aggregator.page_size(10), 20);
        assert_eq!(aggregator.page_size(95), 100);
        assert_eq!(Aggregator::new(&search, 0).page_size(7), 7);
    }

    #[tokio::test]
    async fn test_requests_over_fetched_page() {
        let search = ScriptedSearch::default();
        Aggregator::new(&search, 10)
            .aggregate(&request(&["AI"], 10))
            .await
            .unwrap();
        assert_eq!(search.calls(), [("AI".to_string(), 20, 1)]);
    }

    #[tokio::test]
    async fn test_deduplicates_links_across_categories() {
        let search = ScriptedSearch {
            default_page: vec![article(1)],
            ..Default::default()
        };
        let results = Aggregator::new(&search, 10)
            .aggregate(&request(&["AI", "economy"], 3))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].category, "AI");
        assert_eq!(results[0].articles.len(), 1);
        assert_eq!(results[1].category, "economy");
        assert!(results[1].articles.is_empty());
    }

    #[tokio::test]
    async fn test_trims_to_quota_and_normalizes() {
        let search = ScriptedSearch {
            default_page: articles(1..=5),
            ..Default::default()
        };
        let results = Aggregator::new(&search, 10)
            .aggregate(&request(&["AI"], 3))
            .await
            .unwrap();

        let got = &results[0].articles;
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].pub_date, "2026-02-23");
        assert_eq!(got[0].originallink, None);
    }

    #[tokio::test]
    async fn test_keeps_paging_past_duplicates_until_exhausted() {
        let search = ScriptedSearch::default()
            .page("AI", 1, articles(1..=3))
            .page("economy", 1, articles(1..=3))
            .page("economy", 4, articles(4..=5));

        let results = Aggregator::new(&search, 0)
            .aggregate(&request(&["AI", "economy"], 3))
            .await
            .unwrap();

        let links: Vec<_> = results[1].articles.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, ["https://example.com/4", "https://example.com/5"]);
        assert_eq!(
            search.calls(),
            [
                ("AI".to_string(), 3, 1),
                ("economy".to_string(), 3, 1),
                ("economy".to_string(), 3, 4),
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_at_pagination_ceiling() {
        let search = ScriptedSearch {
            default_page: articles(1..=5),
            ..Default::default()
        };
        let aggregator = Aggregator::new(&search, 0);
        let mut seen = HashSet::new();
        let filters = SearchFilters::default();

        let first = aggregator
            .collect_category("AI", 5, &filters, &mut seen)
            .await
            .unwrap();
        assert_eq!(first.state, PageState::QuotaMet);

        let second = aggregator
            .collect_category("economy", 5, &filters, &mut seen)
            .await
            .unwrap();
        assert_eq!(second.state, PageState::CeilingReached);
        assert!(second.articles.is_empty());
        assert_eq!(second.pages, 200);
        let last = search.calls().last().cloned().unwrap();
        assert_eq!(last, ("economy".to_string(), 5, 996));
    }

    #[tokio::test]
    async fn test_articles_past_quota_stay_unseen() {
        let search = ScriptedSearch::default()
            .page("AI", 1, articles(1..=4))
            .page("economy", 1, articles(1..=4));

        let results = Aggregator::new(&search, 2)
            .aggregate(&request(&["AI", "economy"], 2))
            .await
            .unwrap();

        let titles: Vec<_> = results[1].articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Article 3", "Article 4"]);
    }

    #[tokio::test]
    async fn test_no_link_in_two_categories() {
        let search = ScriptedSearch::default()
            .page("a", 1, articles(1..=6))
            .page("b", 1, articles(4..=9))
            .page("c", 1, articles(1..=12));

        let results = Aggregator::new(&search, 0)
            .aggregate(&request(&["a", "b", "c"], 6))
            .await
            .unwrap();

        let mut all = HashSet::new();
        for result in &results {
            assert!(result.articles.len() <= 6);
            for a in &result.articles {
                assert!(all.insert(a.link.clone()), "duplicate {}", a.link);
            }
        }
    }

    #[tokio::test]
    async fn test_search_failure_aborts_run() {
        let search = ScriptedSearch {
            default_page: articles(1..=3),
            failing_category: Some("economy".to_string()),
            ..Default::default()
        };
        let err = Aggregator::new(&search, 10)
            .aggregate(&request(&["AI", "economy", "sports"], 3))
            .await
            .unwrap_err();

        assert!(matches!(err, NewsError::RateLimited { .. }));
        assert_eq!(search.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls() {
        let search = ScriptedSearch::default();
        let aggregator = Aggregator::new(&search, 10);

        let err = aggregator.aggregate(&request(&[], 3)).await.unwrap_err();
        assert!(matches!(err, NewsError::InvalidRequest(_)));
        let err = aggregator.aggregate(&request(&["AI"], 0)).await.unwrap_err();
        assert!(matches!(err, NewsError::InvalidRequest(_)));
        assert!(search.calls().is_empty());
    }
}
