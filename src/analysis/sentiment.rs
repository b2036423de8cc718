//! Sentiment and topic parsing for batch analysis replies.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default topic when the model names none.
pub const DEFAULT_TOPIC: &str = "General";

static SENTIMENT_FIELD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)SENTIMENT\s*:\s*([^|\n]+)").ok());
static TOPIC_FIELD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)TOPIC\s*:\s*([^|\n]+)").ok());

/// Dominant sentiment across an entity's snippets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    /// Mostly favorable coverage.
    Positive,
    /// Mostly unfavorable coverage.
    Negative,
    /// Nothing notable either way.
    #[default]
    Neutral,
    /// Strong signals both ways.
    Mixed,
}

impl Sentiment {
    /// Parses a model label. Unrecognized labels are neutral.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        let label = label
            .trim()
            .trim_matches(|c: char| c == '.' || c == '"' || c == '*')
            .to_lowercase();
        match label.as_str() {
            "positive" | "positivo" => Self::Positive,
            "negative" | "negativo" => Self::Negative,
            "mixed" | "mixto" => Self::Mixed,
            _ => Self::Neutral,
        }
    }

    /// Label as written in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Mixed => "Mixed",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `SENTIMENT: x | TOPIC: y` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Dominant sentiment.
    pub sentiment: Sentiment,
    /// Dominant topic.
    pub topic: String,
}

impl Default for Assessment {
    fn default() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            topic: DEFAULT_TOPIC.to_string(),
        }
    }
}

/// Reads the first `SENTIMENT:` and `TOPIC:` fields out of `reply`.
///
/// Missing fields keep their defaults, so any text parses.
#[must_use]
pub fn parse_assessment(reply: &str) -> Assessment {
    let mut assessment = Assessment::default();
    if let Some(value) = capture(&SENTIMENT_FIELD, reply) {
        assessment.sentiment = Sentiment::parse(value);
    }
    if let Some(value) = capture(&TOPIC_FIELD, reply) {
        let topic = value.trim().trim_end_matches('.').trim();
        if !topic.is_empty() {
            assessment.topic = topic.to_string();
        }
    }
    assessment
}

fn capture<'a>(re: &LazyLock<Option<Regex>>, text: &'a str) -> Option<&'a str> {
    re.as_ref()?
        .captures(text)?
        .get(1)
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("SENTIMENT: Positive | TOPIC: Expansion", Sentiment::Positive, "Expansion"; "canonical")]
    #[test_case("sentiment: negative | topic: Layoffs.", Sentiment::Negative, "Layoffs"; "lowercase")]
    #[test_case("Here you go:\nSENTIMENT: Mixed | TOPIC: Pricing\n", Sentiment::Mixed, "Pricing"; "with preamble")]
    #[test_case("SENTIMENT: ecstatic | TOPIC: AI", Sentiment::Neutral, "AI"; "unknown sentiment")]
    #[test_case("no fields here", Sentiment::Neutral, "General"; "no fields")]
    #[test_case("SENTIMENT: Positive", Sentiment::Positive, "General"; "missing topic")]
    fn test_parse_assessment(reply: &str, sentiment: Sentiment, topic: &str) {
        let parsed = parse_assessment(reply);
        assert_eq!(parsed.sentiment, sentiment);
        assert_eq!(parsed.topic, topic);
    }

    #[test]
    fn test_sentiment_display() {
        assert_eq!(Sentiment::default().to_string(), "Neutral");
        assert_eq!(Sentiment::parse(" **Positive**. "), Sentiment::Positive);
    }
}
