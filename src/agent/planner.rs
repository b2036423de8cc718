//! Research planner.
//!
//! The plan's shape is fixed (three investigations and a deliverable). The
//! model only contributes notes on what matters most for this company, so
//! a failed model call or an empty search still yields a complete plan.

use tracing::{debug, warn};

use super::classifier::TextClassifier;
use super::prompt::build_planner_prompt;
use super::stage::{ResearchTools, StageOutput};
use crate::core::{ResearchPlan, ResearchTarget, SearchHit};
use crate::error::StageError;

const STAGE: &str = "planner";

/// Default hint results fetched before drafting.
const DEFAULT_HINT_RESULTS: usize = 3;

/// Drafts the [`ResearchPlan`] for a target.
#[derive(Debug, Clone)]
pub struct ResearchPlanner {
    instructions: String,
    hint_results: usize,
}

impl ResearchPlanner {
    /// Creates a planner with the given instructions.
    #[must_use]
    pub const fn new(instructions: String) -> Self {
        Self {
            instructions,
            hint_results: DEFAULT_HINT_RESULTS,
        }
    }

    /// Produces the plan. Never fails; model errors are reported in
    /// [`StageOutput::errors`].
    pub async fn plan(&self, target: &ResearchTarget, tools: ResearchTools<'_>) -> StageOutput<ResearchPlan> {
        let hint_query = format!("{target} company overview strategy");
        let hints = tools.search.search(&hint_query, self.hint_results).await;
        debug!(company = %target, hints = hints.len(), "planner hint search");

        let plan = ResearchPlan::standard(target);
        let out = match self.draft_notes(target, &hints, tools.worker).await {
            Ok(notes) => StageOutput::ok(plan.with_notes(&notes)),
            Err(e) => {
                warn!(company = %target, error = %e, "planner fell back to the standard plan");
                StageOutput::degraded(plan, vec![e])
            }
        };
        out.with_searches(1)
    }

    /// Asks the model for plan notes.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] when the model call fails.
    pub async fn draft_notes(
        &self,
        target: &ResearchTarget,
        hints: &[SearchHit],
        worker: &dyn TextClassifier,
    ) -> Result<String, StageError> {
        let prompt = build_planner_prompt(&self.instructions, target, hints);
        worker
            .generate(&prompt)
            .await
            .map_err(|e| StageError::from_agent(STAGE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::PLANNER_PROMPT;
    use crate::agent::testing::{ScriptedClassifier, StaticSearch};
    use crate::core::PhaseKind;
    use crate::error::ErrorKind;

    fn acme() -> ResearchTarget {
        ResearchTarget::new("Acme Corp").unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn test_plan_with_empty_search() {
        let search = StaticSearch::empty();
        let worker = ScriptedClassifier::always("- check the Foo acquisition");
        let planner = ResearchPlanner::new(PLANNER_PROMPT.to_string());
        let out = planner
            .plan(&acme(), ResearchTools { search: &search, worker: &worker })
            .await;
        assert!(out.is_clean());
        assert_eq!(out.value.phases().len(), 4);
        assert_eq!(out.value.phases()[3].kind, PhaseKind::Deliverable);
        assert_eq!(out.value.notes(), Some("- check the Foo acquisition"));
        assert_eq!(search.calls(), 1);
        assert_eq!(out.searches, 1);
        assert!(!worker.prompts()[0].contains("</sources>"));
    }

    #[tokio::test]
    async fn test_plan_survives_model_failure() {
        let search = StaticSearch::with_hits(2);
        let worker = ScriptedClassifier::failing();
        let planner = ResearchPlanner::new(PLANNER_PROMPT.to_string());
        let out = planner
            .plan(&acme(), ResearchTools { search: &search, worker: &worker })
            .await;
        assert_eq!(out.value, ResearchPlan::standard(&acme()));
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind(), ErrorKind::Transient);
    }

    #[tokio::test]
    async fn test_hints_reach_prompt() {
        let search = StaticSearch::with_hits(2);
        let worker = ScriptedClassifier::always("notes");
        let planner = ResearchPlanner::new("PLAN".to_string());
        let _ = planner
            .plan(&acme(), ResearchTools { search: &search, worker: &worker })
            .await;
        assert!(worker.prompts()[0].contains("</sources>"));
        assert_eq!(search.queries()[0], "Acme Corp company overview strategy");
    }
}
