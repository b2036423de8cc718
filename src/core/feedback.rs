//! Evaluator feedback and follow-up queries.

use serde::{Deserialize, Deserializer, Serialize};

use super::grade::Grade;

/// A single free-text search query.
///
/// Deserializes from either a bare string or an object carrying a
/// `search_query` (or `query`) field. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Wraps a query string.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the query is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SearchQuery {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuery {
    Text(String),
    Object {
        #[serde(alias = "query")]
        search_query: String,
    },
}

impl<'de> Deserialize<'de> for SearchQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawQuery::deserialize(deserializer)? {
            RawQuery::Text(text) | RawQuery::Object { search_query: text } => Self(text),
        })
    }
}

/// The evaluator's verdict on the current finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Pass or fail. Missing or unrecognized grades are fail.
    #[serde(default)]
    pub grade: Grade,
    /// Rationale for the grade. `null` is read as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    /// Queries that would close the gaps. A `null` list or entry is skipped.
    #[serde(default, deserialize_with = "queries_skipping_nulls")]
    pub follow_up_queries: Vec<SearchQuery>,
}

impl Feedback {
    /// Feedback used when the evaluator output could not be read.
    ///
    /// Always a fail with no follow-ups.
    #[must_use]
    pub fn fail_safe(reason: impl Into<String>) -> Self {
        Self {
            grade: Grade::Fail,
            comment: reason.into(),
            follow_up_queries: Vec::new(),
        }
    }

    /// Returns `true` for a fail with nothing to search next.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !self.grade.is_pass() && self.follow_up_queries.iter().all(SearchQuery::is_blank)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn queries_skipping_nulls<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<SearchQuery>, D::Error> {
    let raw: Vec<Option<SearchQuery>> = null_as_default(deserializer)?;
    Ok(raw.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_with_object_queries() {
        let json = r#"{"grade":"fail","comment":"thin","follow_up_queries":[{"search_query":"Acme pricing"},"Acme Glassdoor"]}"#;
        let fb: Feedback = serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert_eq!(fb.grade, Grade::Fail);
        assert_eq!(
            fb.follow_up_queries,
            vec![SearchQuery::new("Acme pricing"), SearchQuery::new("Acme Glassdoor")]
        );
    }

    #[test]
    fn test_feedback_null_queries() {
        let json = r#"{"grade":"pass","comment":"ok","follow_up_queries":null}"#;
        let fb: Feedback = serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert!(fb.grade.is_pass());
        assert!(fb.follow_up_queries.is_empty());
    }

    #[test]
    fn test_feedback_null_comment_keeps_follow_ups() {
        let json = r#"{"grade":"fail","comment":null,"follow_up_queries":["Acme glassdoor",null]}"#;
        let fb: Feedback = serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert_eq!(fb.grade, Grade::Fail);
        assert!(fb.comment.is_empty());
        assert_eq!(fb.follow_up_queries, vec![SearchQuery::new("Acme glassdoor")]);
        assert!(!fb.is_degenerate());
    }

    #[test]
    fn test_feedback_missing_grade_is_fail() {
        let fb: Feedback =
            serde_json::from_str(r#"{"comment":"?"}"#).unwrap_or_else(|_| unreachable!());
        assert_eq!(fb.grade, Grade::Fail);
        assert!(fb.is_degenerate());
    }

    #[test]
    fn test_fail_safe() {
        let fb = Feedback::fail_safe("unreadable");
        assert_eq!(fb.grade, Grade::Fail);
        assert_eq!(fb.comment, "unreadable");
        assert!(fb.is_degenerate());
    }

    #[test]
    fn test_blank_queries_are_degenerate() {
        let fb = Feedback {
            grade: Grade::Fail,
            comment: String::new(),
            follow_up_queries: vec![SearchQuery::new("  ")],
        };
        assert!(fb.is_degenerate());
    }
}
