//! Recent news scan across entities.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::Domain;
use crate::agent::search::SearchProvider;

/// Results requested per news query.
const NEWS_RESULTS: usize = 3;

/// One news hit tagged with the entity it was found for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Entity searched.
    pub entity: String,
    /// Headline.
    pub title: String,
    /// Source URL.
    pub url: String,
    /// Short excerpt.
    pub snippet: String,
}

/// Runs the domain's news queries for each entity.
pub struct NewsMonitor {
    search: Arc<dyn SearchProvider>,
}

impl NewsMonitor {
    /// Creates a monitor over `search`.
    #[must_use]
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self { search }
    }

    /// Scans every entity. Items are deduplicated by URL across the whole
    /// scan, keeping the first entity that surfaced them.
    pub async fn scan(&self, domain: Domain, entities: &[String]) -> Vec<NewsItem> {
        let profile = domain.profile();
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for entity in entities {
            for query in profile.news_queries(entity) {
                for hit in self.search.search(&query, NEWS_RESULTS).await {
                    if !hit.url.is_empty() && !seen.insert(hit.url.clone()) {
                        continue;
                    }
                    items.push(NewsItem {
                        entity: entity.clone(),
                        title: if hit.title.is_empty() {
                            "Untitled".to_string()
                        } else {
                            hit.title
                        },
                        url: hit.url,
                        snippet: hit.snippet,
                    });
                }
            }
        }
        debug!(domain = %domain, entities = entities.len(), items = items.len(), "news scan complete");
        items
    }
}

impl std::fmt::Debug for NewsMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsMonitor").finish_non_exhaustive()
    }
}
