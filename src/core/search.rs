//! Search result records.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// One ranked web search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title.
    #[serde(default)]
    pub title: String,
    /// Source URL.
    #[serde(default, alias = "link", alias = "href")]
    pub url: String,
    /// Short text excerpt.
    #[serde(default, alias = "summary", alias = "body")]
    pub snippet: String,
}

impl SearchHit {
    /// Creates a hit.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }

    /// Builds a hit from one loosely shaped JSON entry.
    ///
    /// Nulls and non-string fields count as empty. The URL is the first
    /// non-empty of `url`, `link` and `href`; the snippet the first of
    /// `snippet`, `summary` and `body`. Entries that are not objects, or
    /// carry neither title nor snippet, yield `None`.
    #[must_use]
    pub fn from_json(item: &serde_json::Value) -> Option<Self> {
        let obj = item.as_object()?;
        let field = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| obj.get(*k).and_then(serde_json::Value::as_str))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .unwrap_or_default()
                .to_string()
        };
        let hit = Self::new(
            field(&["title"]),
            field(&["url", "link", "href"]),
            field(&["snippet", "summary", "body"]),
        );
        (!hit.title.is_empty() || !hit.snippet.is_empty()).then_some(hit)
    }

    /// Renders the hit as a markdown bullet.
    #[must_use]
    pub fn to_bullet(&self) -> String {
        if self.url.is_empty() {
            format!("- **{}**: {}", self.title, self.snippet)
        } else {
            format!("- **{}** ({}): {}", self.title, self.url, self.snippet)
        }
    }
}

/// Truncates `text` to at most `max` grapheme clusters.
#[must_use]
pub fn truncate_graphemes(text: &str, max: usize) -> &str {
    text.grapheme_indices(true)
        .nth(max)
        .map_or(text, |(idx, _)| &text[..idx])
}
