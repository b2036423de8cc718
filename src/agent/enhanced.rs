//! Follow-up searches after a failed evaluation.

use tracing::{debug, warn};

use super::researcher::snippet_bullets;
use super::stage::{ResearchTools, StageOutput};
use super::prompt::build_summary_prompt;
use crate::core::{Feedback, Finding, ResearchTarget, SearchQuery};
use crate::error::StageError;

const STAGE: &str = "enhanced_search";

/// Runs the evaluator's follow-up queries and appends what they find.
///
/// The finding is only ever appended to. A passing feedback, an empty
/// follow-up list, or queries that return nothing leave it byte-identical.
#[derive(Debug, Clone)]
pub struct EnhancedSearchExecutor {
    summary_instructions: String,
    results_per_query: usize,
}

impl EnhancedSearchExecutor {
    /// Creates an executor.
    #[must_use]
    pub const fn new(summary_instructions: String, results_per_query: usize) -> Self {
        Self {
            summary_instructions,
            results_per_query,
        }
    }

    /// Executes follow-ups from `feedback`, appending to `finding`.
    ///
    /// The returned value is the number of sections appended.
    pub async fn execute(
        &self,
        target: &ResearchTarget,
        feedback: &Feedback,
        finding: &mut Finding,
        tools: ResearchTools<'_>,
    ) -> StageOutput<usize> {
        if feedback.grade.is_pass() {
            debug!("feedback passed; nothing to search");
            return StageOutput::ok(0);
        }

        let mut errors = Vec::new();
        let mut searches = 0;
        let mut appended = 0;

        for query in feedback.follow_up_queries.iter().filter(|q| !q.is_blank()) {
            searches += 1;
            let hits = tools
                .search
                .search(query.as_str(), self.results_per_query)
                .await;
            if hits.is_empty() {
                debug!(query = %query, "follow-up returned no hits");
                continue;
            }

            let body = match self.summarize(target, query, &hits, tools).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => snippet_bullets(&hits),
                Err(e) => {
                    warn!(query = %query, error = %e, "follow-up summary failed; keeping raw snippets");
                    errors.push(e);
                    snippet_bullets(&hits)
                }
            };
            if finding.append_section(&format!("Follow-up: {query}"), &body) {
                appended += 1;
            }
        }

        debug!(searches, appended, "enhanced search complete");
        StageOutput::degraded(appended, errors).with_searches(searches)
    }

    async fn summarize(
        &self,
        target: &ResearchTarget,
        query: &SearchQuery,
        hits: &[crate::core::SearchHit],
        tools: ResearchTools<'_>,
    ) -> Result<String, StageError> {
        let objective = format!("Follow-up question: {query}");
        let prompt = build_summary_prompt(&self.summary_instructions, target, &objective, hits);
        tools
            .worker
            .generate(&prompt)
            .await
            .map_err(|e| StageError::from_agent(STAGE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{ScriptedClassifier, StaticSearch};
    use crate::core::Grade;

    fn acme() -> ResearchTarget {
        ResearchTarget::new("Acme Corp").unwrap_or_else(|_| unreachable!())
    }

    fn seeded() -> Finding {
        let mut f = Finding::titled("Research findings: Acme Corp");
        f.append_section("Strategy", "Acquired Foo in 2024.");
        f
    }

    fn executor() -> EnhancedSearchExecutor {
        EnhancedSearchExecutor::new("SUM".to_string(), 3)
    }

    #[tokio::test]
    async fn test_empty_follow_ups_is_noop() {
        let search = StaticSearch::with_hits(3);
        let worker = ScriptedClassifier::always("text");
        let mut finding = seeded();
        let before = finding.as_str().as_bytes().to_vec();
        let out = executor()
            .execute(
                &acme(),
                &Feedback::fail_safe("no queries"),
                &mut finding,
                ResearchTools { search: &search, worker: &worker },
            )
            .await;
        assert_eq!(finding.as_str().as_bytes(), before.as_slice());
        assert_eq!(out.value, 0);
        assert_eq!(out.searches, 0);
        assert_eq!(search.calls(), 0);
        assert_eq!(worker.calls(), 0);
    }

    #[tokio::test]
    async fn test_pass_is_noop() {
        let search = StaticSearch::with_hits(3);
        let worker = ScriptedClassifier::always("text");
        let mut finding = seeded();
        let before = finding.clone();
        let feedback = Feedback {
            grade: Grade::Pass,
            comment: String::new(),
            follow_up_queries: vec![SearchQuery::new("Acme glassdoor")],
        };
        let _ = executor()
            .execute(&acme(), &feedback, &mut finding, ResearchTools { search: &search, worker: &worker })
            .await;
        assert_eq!(finding, before);
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn test_appends_without_rewriting() {
        let search = StaticSearch::with_hits(2);
        let worker = ScriptedClassifier::sequence(vec!["Employees praise culture.", ""]);
        let mut finding = seeded();
        let before = finding.as_str().to_string();
        let feedback = Feedback {
            grade: Grade::Fail,
            comment: "reputation missing".to_string(),
            follow_up_queries: vec![SearchQuery::new("Acme glassdoor"), SearchQuery::new("Acme reddit")],
        };
        let out = executor()
            .execute(&acme(), &feedback, &mut finding, ResearchTools { search: &search, worker: &worker })
            .await;
        assert!(finding.as_str().starts_with(&before));
        assert!(finding.as_str().contains("## Follow-up: Acme glassdoor\n\nEmployees praise culture."));
        // Blank summary falls back to bullets.
        assert!(finding.as_str().contains("- **Acme reddit result 0**"));
        assert_eq!(out.value, 2);
        assert_eq!(out.searches, 2);
    }

    #[tokio::test]
    async fn test_no_hits_leaves_finding_unchanged() {
        let search = StaticSearch::empty();
        let worker = ScriptedClassifier::always("text");
        let mut finding = seeded();
        let before = finding.clone();
        let feedback = Feedback {
            grade: Grade::Fail,
            comment: String::new(),
            follow_up_queries: vec![SearchQuery::new("Acme layoffs")],
        };
        let out = executor()
            .execute(&acme(), &feedback, &mut finding, ResearchTools { search: &search, worker: &worker })
            .await;
        assert_eq!(finding, before);
        assert_eq!(out.searches, 1);
        assert_eq!(worker.calls(), 0);
    }
}
