//! Web search capability.
//!
//! [`SearchProvider`] never fails: transport problems surface as an empty
//! result list plus a warning. [`GroundedSearch`] implements it by asking a
//! search-grounded model for results as JSON.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::classifier::TextClassifier;
use super::prompt::build_search_prompt;
use crate::core::{SearchHit, truncate_graphemes};

/// Maximum characters kept from an unparseable search response.
const RAW_RESULT_MAX_CHARS: usize = 500;

/// A best-effort ranked web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns up to `num_results` hits for `query`, or an empty list on
    /// any failure.
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit>;
}

/// Search provider backed by a grounded text model.
pub struct GroundedSearch {
    model: Arc<dyn TextClassifier>,
    instructions: String,
}

impl GroundedSearch {
    /// Creates a grounded search over `model` using the given instructions.
    #[must_use]
    pub fn new(model: Arc<dyn TextClassifier>, instructions: String) -> Self {
        Self {
            model,
            instructions,
        }
    }
}

impl std::fmt::Debug for GroundedSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroundedSearch").finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchProvider for GroundedSearch {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        if query.trim().is_empty() || num_results == 0 {
            return Vec::new();
        }
        let prompt = build_search_prompt(&self.instructions, query, num_results);
        match self.model.generate(&prompt).await {
            Ok(content) => {
                let hits = parse_search_hits(query, &content, num_results);
                debug!(query, hits = hits.len(), "grounded search completed");
                hits
            }
            Err(e) => {
                warn!(query, error = %e, "grounded search failed");
                Vec::new()
            }
        }
    }
}

/// Strips markdown code fences around a JSON payload.
pub(crate) fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

/// Parses a grounded model's answer into search hits.
///
/// Accepts a JSON array or a `{"results": [...]}` wrapper, converting each
/// entry on its own so one malformed entry does not cost the rest. Anything else
/// becomes a single hit carrying the raw text (truncated), so a chatty
/// model still yields usable material. Blank answers yield nothing.
#[must_use]
pub fn parse_search_hits(query: &str, content: &str, num_results: usize) -> Vec<SearchHit> {
    let json_str = strip_code_fences(content);
    if json_str.is_empty() {
        return Vec::new();
    }

    let items = match serde_json::from_str::<serde_json::Value>(json_str) {
        Ok(serde_json::Value::Array(items)) => Some(items),
        Ok(serde_json::Value::Object(mut map)) => match map.remove("results") {
            Some(serde_json::Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    };

    match items {
        Some(items) => items
            .iter()
            .filter_map(SearchHit::from_json)
            .take(num_results)
            .collect(),
        None => vec![SearchHit::new(
            format!("Search result for: {query}"),
            String::new(),
            truncate_graphemes(json_str, RAW_RESULT_MAX_CHARS),
        )],
    }
}
