//! Section researcher.
//!
//! Walks the plan in order. Each investigation phase gets 3 or 4 queries,
//! every query goes to the search provider, and the combined hits are
//! summarized by the worker model into one section of the [`Finding`].
//! The deliverable phase then compiles a report from the finding alone.
//!
//! Degradation ladder per phase:
//!
//! ```text
//! query generation fails → deterministic per-dimension queries
//! no hits at all         → placeholder paragraph
//! summary fails          → bullet list of raw snippets
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::classifier::TextClassifier;
use super::config::AgentConfig;
use super::prompt::{PromptSet, build_query_prompt, build_report_prompt, build_summary_prompt};
use super::stage::{ResearchTools, StageOutput};
use crate::core::{Finding, PlanPhase, ResearchPlan, ResearchTarget, SearchHit, SearchQuery};
use crate::error::StageError;

const STAGE: &str = "researcher";

/// Leading list markers on generated query lines.
static LIST_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s*").ok());

/// Executes the plan and builds the first version of the finding.
#[derive(Debug, Clone)]
pub struct SectionResearcher {
    query_instructions: String,
    summary_instructions: String,
    report_instructions: String,
    queries_per_phase: usize,
    results_per_query: usize,
}

impl SectionResearcher {
    /// Creates a researcher from prompts and configuration.
    #[must_use]
    pub fn new(prompts: &PromptSet, config: &AgentConfig) -> Self {
        Self {
            query_instructions: prompts.queries.clone(),
            summary_instructions: prompts.summary.clone(),
            report_instructions: prompts.report.clone(),
            queries_per_phase: config.clamped_queries_per_phase(),
            results_per_query: config.results_per_query,
        }
    }

    /// Runs every phase of `plan`.
    ///
    /// The returned finding is never empty: it starts with the echoed plan
    /// and every investigation phase contributes a section, even if only a
    /// placeholder.
    pub async fn research(&self, plan: &ResearchPlan, tools: ResearchTools<'_>) -> StageOutput<Finding> {
        let target = plan.target();
        let mut errors = Vec::new();
        let mut searches = 0;

        let mut finding = Finding::titled(&format!("Research findings: {target}"));
        finding.append_section("Research plan", &plan.render());

        for phase in plan.investigations() {
            let queries = match self.generate_queries(target, phase, tools.worker).await {
                Ok(queries) => queries,
                Err(e) => {
                    warn!(phase = %phase.title, error = %e, "query generation failed");
                    errors.push(e);
                    Vec::new()
                }
            };
            let queries = self.fill_queries(target, phase, queries);

            let mut hits = Vec::new();
            for query in &queries {
                searches += 1;
                hits.extend(
                    tools
                        .search
                        .search(query.as_str(), self.results_per_query)
                        .await,
                );
            }
            let hits = dedup_hits(hits);
            debug!(
                phase = %phase.title,
                queries = queries.len(),
                hits = hits.len(),
                "phase searched"
            );

            let body = if hits.is_empty() {
                placeholder(target, phase)
            } else {
                let objective = format!("{}: {}", phase.title, phase.directive);
                match self
                    .summarize(target, &objective, &hits, tools.worker)
                    .await
                {
                    Ok(text) if !text.trim().is_empty() => text,
                    Ok(_) => snippet_bullets(&hits),
                    Err(e) => {
                        warn!(phase = %phase.title, error = %e, "summary failed; keeping raw snippets");
                        errors.push(e);
                        snippet_bullets(&hits)
                    }
                }
            };
            finding.append_section(&phase.title, &body);
        }

        if let Some(deliverable) = plan.deliverable() {
            match self.compile_report(target, &finding, tools.worker).await {
                Ok(report) => {
                    finding.append_section(&deliverable.title, &report);
                }
                Err(e) => {
                    warn!(error = %e, "report compilation failed");
                    errors.push(e);
                }
            }
        }

        info!(
            company = %target,
            sections = finding.sections(),
            searches,
            degraded = errors.len(),
            "initial research complete"
        );
        StageOutput::degraded(finding, errors).with_searches(searches)
    }

    /// Asks the model for search queries for one phase.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] when the model call fails.
    pub async fn generate_queries(
        &self,
        target: &ResearchTarget,
        phase: &PlanPhase,
        worker: &dyn TextClassifier,
    ) -> Result<Vec<SearchQuery>, StageError> {
        let prompt = build_query_prompt(&self.query_instructions, target, phase, self.queries_per_phase);
        let content = worker
            .generate(&prompt)
            .await
            .map_err(|e| StageError::from_agent(STAGE, e))?;
        Ok(parse_query_lines(&content))
    }

    /// Tops up model queries with deterministic ones and caps the count.
    fn fill_queries(&self, target: &ResearchTarget, phase: &PlanPhase, mut queries: Vec<SearchQuery>) -> Vec<SearchQuery> {
        if queries.len() < 3 {
            let fallback = phase
                .dimension
                .map(|d| d.fallback_queries(target))
                .unwrap_or_default();
            for q in fallback {
                if queries.len() >= self.queries_per_phase {
                    break;
                }
                queries.push(SearchQuery::new(q));
            }
        }
        queries.truncate(self.queries_per_phase);
        queries
    }

    /// Folds search hits into prose.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] when the model call fails.
    pub async fn summarize(
        &self,
        target: &ResearchTarget,
        objective: &str,
        hits: &[SearchHit],
        worker: &dyn TextClassifier,
    ) -> Result<String, StageError> {
        let prompt = build_summary_prompt(&self.summary_instructions, target, objective, hits);
        worker
            .generate(&prompt)
            .await
            .map_err(|e| StageError::from_agent(STAGE, e))
    }

    /// Compiles the deliverable from the finding.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] when the model call fails or returns
    /// nothing.
    pub async fn compile_report(
        &self,
        target: &ResearchTarget,
        finding: &Finding,
        worker: &dyn TextClassifier,
    ) -> Result<String, StageError> {
        let prompt = build_report_prompt(&self.report_instructions, target, finding);
        let report = worker
            .generate(&prompt)
            .await
            .map_err(|e| StageError::from_agent(STAGE, e))?;
        if report.trim().is_empty() {
            return Err(StageError::Malformed {
                stage: STAGE,
                message: "empty report".to_string(),
                content: report,
            });
        }
        Ok(report)
    }
}

/// Splits model output into queries, one per line.
pub(crate) fn parse_query_lines(content: &str) -> Vec<SearchQuery> {
    content
        .lines()
        .map(|line| {
            let stripped = LIST_MARKER
                .as_ref()
                .map_or(line, |re| re.find(line).map_or(line, |m| &line[m.end()..]));
            stripped.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`')
        })
        .filter(|line| !line.is_empty())
        .map(SearchQuery::new)
        .collect()
}

/// Drops repeated URLs, keeping the first occurrence.
fn dedup_hits(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|h| h.url.is_empty() || seen.insert(h.url.clone()))
        .collect()
}

pub(crate) fn snippet_bullets(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(SearchHit::to_bullet)
        .collect::<Vec<_>>()
        .join("\n")
}

fn placeholder(target: &ResearchTarget, phase: &PlanPhase) -> String {
    format!(
        "No public sources were found for {target} on this topic ({}). \
         Treat this area as unverified.",
        phase.title.to_lowercase()
    )
}
