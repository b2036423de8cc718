//! Per-entity competitive analysis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::Domain;
use super::sentiment::{Assessment, Sentiment, parse_assessment};
use crate::agent::classifier::TextClassifier;
use crate::agent::prompt::build_market_prompt;
use crate::agent::search::SearchProvider;

/// Results requested when measuring visibility.
const VISIBILITY_RESULTS: usize = 10;
/// Points per visibility hit.
const VISIBILITY_PER_HIT: usize = 100;
/// Visibility assigned when the measurement finds nothing.
const VISIBILITY_FLOOR: usize = 50;
/// Results requested per domain query.
const RESULTS_PER_QUERY: usize = 2;
/// Source recorded when no web result exists.
pub const NO_SOURCE: &str = "N/A";

/// Whether an analyzed entity is the user's company or a rival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// The company running the analysis.
    Own,
    /// A competitor.
    Competitor,
}

impl EntityKind {
    /// Label used in tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Competitor => "competitor",
        }
    }
}

/// One entity queued for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketTarget {
    /// Entity name.
    pub name: String,
    /// Own company or competitor.
    pub kind: EntityKind,
}

impl MarketTarget {
    /// The user's company.
    #[must_use]
    pub fn own(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Own,
        }
    }

    /// A competitor.
    #[must_use]
    pub fn competitor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Competitor,
        }
    }
}

/// Analysis output for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorRecord {
    /// Entity name.
    pub entity: String,
    /// Own company or competitor.
    pub kind: EntityKind,
    /// Approximate web visibility score.
    pub visibility: usize,
    /// Dominant sentiment.
    pub sentiment: Sentiment,
    /// Dominant topic.
    pub topic: String,
    /// URL of the first search hit.
    pub top_source: String,
    /// Snippets fed to the classifier.
    pub results: usize,
    /// Whether placeholder snippets stood in for missing search results.
    pub simulated: bool,
    /// Problems met while analyzing this entity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Analyzes one entity at a time. Holds no per-entity state, so a single
/// analyzer can serve any number of concurrent calls.
pub struct CompetitorAnalyzer {
    search: Arc<dyn SearchProvider>,
    classifier: Arc<dyn TextClassifier>,
    domain: Domain,
    instructions: String,
}

impl CompetitorAnalyzer {
    /// Creates an analyzer for `domain`.
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchProvider>,
        classifier: Arc<dyn TextClassifier>,
        domain: Domain,
        instructions: String,
    ) -> Self {
        Self {
            search,
            classifier,
            domain,
            instructions,
        }
    }

    /// Domain this analyzer searches.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Measures, searches and classifies `target`. Never fails; problems
    /// are noted on the record.
    pub async fn analyze(&self, target: &MarketTarget) -> CompetitorRecord {
        let name = target.name.as_str();
        let profile = self.domain.profile();
        let mut notes = Vec::new();

        let visibility = self.visibility(name).await;

        let mut hits = Vec::new();
        for query in profile.search_queries(name) {
            hits.extend(self.search.search(&query, RESULTS_PER_QUERY).await);
        }
        let top_source = hits
            .iter()
            .map(|h| h.url.trim())
            .find(|url| !url.is_empty())
            .unwrap_or(NO_SOURCE)
            .to_string();

        let mut snippets: Vec<String> = hits
            .iter()
            .map(|h| h.snippet.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let simulated = snippets.is_empty();
        if simulated {
            warn!(entity = name, "no web results; using simulated snippets");
            notes.push("no web results; simulated snippets used".to_string());
            snippets = profile.simulated_snippets(name);
        }

        let prompt = build_market_prompt(&self.instructions, name, profile.topics, &snippets);
        let assessment = match self.classifier.generate(&prompt).await {
            Ok(reply) => parse_assessment(&reply),
            Err(e) => {
                warn!(entity = name, error = %e, "classification failed; keeping defaults");
                notes.push(format!("classification failed: {e}"));
                Assessment::default()
            }
        };

        info!(
            entity = name,
            visibility,
            results = snippets.len(),
            sentiment = %assessment.sentiment,
            "entity analyzed"
        );
        CompetitorRecord {
            entity: name.to_string(),
            kind: target.kind,
            visibility,
            sentiment: assessment.sentiment,
            topic: assessment.topic,
            top_source,
            results: snippets.len(),
            simulated,
            notes,
        }
    }

    async fn visibility(&self, name: &str) -> usize {
        let hits = self
            .search
            .search(&format!("\"{name}\""), VISIBILITY_RESULTS)
            .await;
        debug!(entity = name, hits = hits.len(), "visibility measured");
        match hits.len() * VISIBILITY_PER_HIT {
            0 => VISIBILITY_FLOOR,
            score => score,
        }
    }
}

impl std::fmt::Debug for CompetitorAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitorAnalyzer")
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::MARKET_PROMPT;
    use crate::agent::testing::{ScriptedClassifier, StaticSearch};
    use crate::analysis::sentiment::DEFAULT_TOPIC;

    fn analyzer(search: StaticSearch, classifier: ScriptedClassifier) -> CompetitorAnalyzer {
        CompetitorAnalyzer::new(
            Arc::new(search),
            Arc::new(classifier),
            Domain::Payroll,
            MARKET_PROMPT.to_string(),
        )
    }

    #[tokio::test]
    async fn test_record_from_search_and_classifier() {
        let a = analyzer(
            StaticSearch::with_hits(10),
            ScriptedClassifier::always("SENTIMENT: Positive | TOPIC: Automation"),
        );
        let record = a.analyze(&MarketTarget::competitor("Acme")).await;

        assert_eq!(record.visibility, 1000);
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(record.topic, "Automation");
        assert_eq!(record.results, 10);
        assert!(!record.simulated);
        assert!(record.top_source.starts_with("https://example.com/"));
        assert_eq!(record.kind, EntityKind::Competitor);
    }

    #[tokio::test]
    async fn test_no_results_uses_simulated_snippets() {
        let classifier = ScriptedClassifier::always("SENTIMENT: Neutral | TOPIC: Payroll");
        let search = StaticSearch::empty();
        let a = CompetitorAnalyzer::new(
            Arc::new(search),
            Arc::new(classifier),
            Domain::Payroll,
            MARKET_PROMPT.to_string(),
        );
        let record = a.analyze(&MarketTarget::own("Acme")).await;

        assert_eq!(record.visibility, 50);
        assert!(record.simulated);
        assert_eq!(record.results, 3);
        assert_eq!(record.top_source, NO_SOURCE);
        assert_eq!(record.notes.len(), 1);
    }

    #[tokio::test]
    async fn test_classifier_failure_keeps_defaults() {
        let a = analyzer(StaticSearch::with_hits(1), ScriptedClassifier::failing());
        let record = a.analyze(&MarketTarget::competitor("Acme")).await;

        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.topic, DEFAULT_TOPIC);
        assert!(record.notes.iter().any(|n| n.contains("classification failed")));
    }

    #[tokio::test]
    async fn test_prompt_carries_snippets_and_topics() {
        let classifier = Arc::new(ScriptedClassifier::always("SENTIMENT: Mixed | TOPIC: Pricing"));
        let search = Arc::new(StaticSearch::with_hits(1));
        let a = CompetitorAnalyzer::new(
            Arc::clone(&search) as Arc<dyn SearchProvider>,
            Arc::clone(&classifier) as Arc<dyn TextClassifier>,
            Domain::Payroll,
            MARKET_PROMPT.to_string(),
        );
        let _ = a.analyze(&MarketTarget::competitor("Acme")).await;

        // Visibility probe plus the five domain queries.
        assert_eq!(search.calls(), 6);
        let prompt = &classifier.prompts()[0];
        assert!(prompt.contains("<company>Acme</company>"));
        assert!(prompt.contains("Time tracking"));
        assert!(prompt.contains("- Snippet about Acme payroll software outsourcing #0"));
    }
}
