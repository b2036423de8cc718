//! Per-run state threaded through the pipeline.

use crate::core::{Feedback, Finding, ResearchPlan, ResearchTarget};
use crate::error::StageError;

/// Everything one research run knows. Created at run start, owned by the
/// orchestrator and lent to one stage at a time.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Company under investigation.
    pub target: ResearchTarget,
    /// Plan from the planner. Set once.
    pub plan: Option<ResearchPlan>,
    /// Cumulative finding. Only ever appended to.
    pub finding: Finding,
    /// Latest evaluator verdict.
    pub feedback: Option<Feedback>,
    /// Evaluator calls made so far.
    pub evaluations: usize,
    /// Enhanced search passes made so far.
    pub enhanced_runs: usize,
    /// Search calls made so far, across all stages.
    pub searches: usize,
    /// Failures recovered from so far.
    pub errors: Vec<StageError>,
}

impl RunState {
    /// Fresh state for `target`.
    #[must_use]
    pub fn new(target: ResearchTarget) -> Self {
        Self {
            target,
            plan: None,
            finding: Finding::default(),
            feedback: None,
            evaluations: 0,
            enhanced_runs: 0,
            searches: 0,
            errors: Vec::new(),
        }
    }
}
