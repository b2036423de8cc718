//! Deep Research orchestrator.
//!
//! Sequences planner → researcher → a bounded evaluate/re-search loop,
//! threading one [`RunState`] through every stage. The loop is an explicit
//! state machine:
//!
//! ```text
//! Researching ──► Evaluating{1} ──pass──► Escalated
//!                      │
//!                     fail → enhanced search
//!                      │
//!                      ├── i < max ──► Evaluating{i+1}
//!                      └── i = max ──► Exhausted
//! ```
//!
//! Both terminal states return the finding accumulated so far. Stage
//! failures never abort the run; they are collected on the report.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::classifier::{LlmClassifier, TextClassifier};
use super::client::create_provider;
use super::config::AgentConfig;
use super::enhanced::EnhancedSearchExecutor;
use super::escalation::{EscalationChecker, LoopSignal};
use super::evaluator::ResearchEvaluator;
use super::planner::ResearchPlanner;
use super::prompt::PromptSet;
use super::researcher::SectionResearcher;
use super::search::{GroundedSearch, SearchProvider};
use super::stage::{ResearchTools, StageOutput};
use super::state::RunState;
use crate::core::{Feedback, Finding, ResearchPlan, ResearchTarget};
use crate::error::AgentError;

/// Position of a run in the refinement loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Planning and the initial research pass.
    Researching,
    /// About to run the evaluator for the given 1-based iteration.
    Evaluating {
        /// Current iteration.
        iteration: usize,
    },
    /// The evaluator passed; the loop stopped early.
    Escalated {
        /// Evaluations performed.
        iterations: usize,
    },
    /// The iteration budget ran out without a pass.
    Exhausted {
        /// Evaluations performed.
        iterations: usize,
    },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Terminated on a passing evaluation.
    Escalated,
    /// Terminated on the iteration cap.
    Exhausted,
}

impl Outcome {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Escalated => "escalated",
            Self::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one Deep Research run.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    /// Company researched.
    pub target: String,
    /// Plan the run followed.
    pub plan: ResearchPlan,
    /// Cumulative finding.
    pub finding: Finding,
    /// Last evaluator verdict, if any evaluation ran.
    pub feedback: Option<Feedback>,
    /// Terminal state.
    pub outcome: Outcome,
    /// Evaluator calls made.
    pub evaluations: usize,
    /// Enhanced search passes made.
    pub enhanced_runs: usize,
    /// Search calls issued across all stages.
    pub searches: usize,
    /// Recovered stage failures, formatted.
    pub errors: Vec<String>,
    /// Wall time in milliseconds.
    pub elapsed_ms: u128,
}

impl ResearchReport {
    /// The finding text, or a fixed notice when nothing was found.
    #[must_use]
    pub fn deep_research_text(&self) -> &str {
        if self.finding.as_str().trim().is_empty() {
            "No findings generated."
        } else {
            self.finding.as_str()
        }
    }
}

/// Drives one research run per call. Runs share nothing but the
/// collaborators.
pub struct ResearchOrchestrator {
    search: Arc<dyn SearchProvider>,
    worker: Arc<dyn TextClassifier>,
    critic: Arc<dyn TextClassifier>,
    planner: ResearchPlanner,
    researcher: SectionResearcher,
    evaluator: ResearchEvaluator,
    enhanced: EnhancedSearchExecutor,
    checker: EscalationChecker,
    max_iterations: usize,
}

impl ResearchOrchestrator {
    /// Creates an orchestrator over explicit collaborators.
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchProvider>,
        worker: Arc<dyn TextClassifier>,
        critic: Arc<dyn TextClassifier>,
        config: &AgentConfig,
        prompts: &PromptSet,
    ) -> Self {
        Self {
            search,
            worker,
            critic,
            planner: ResearchPlanner::new(prompts.planner.clone()),
            researcher: SectionResearcher::new(prompts, config),
            evaluator: ResearchEvaluator::new(config.max_follow_ups),
            enhanced: EnhancedSearchExecutor::new(prompts.summary.clone(), config.results_per_query),
            checker: EscalationChecker,
            max_iterations: config.max_iterations,
        }
    }

    /// Wires the LLM-backed worker, critic and grounded search from
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the provider cannot be created.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        Self::with_prompts(config, &PromptSet::load(config.prompt_dir.as_deref()))
    }

    /// Like [`ResearchOrchestrator::from_config`] with an already resolved
    /// prompt set.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the provider cannot be created.
    pub fn with_prompts(config: &AgentConfig, prompts: &PromptSet) -> Result<Self, AgentError> {
        let provider = create_provider(config)?;
        let worker: Arc<dyn TextClassifier> = Arc::new(LlmClassifier::worker(
            Arc::clone(&provider),
            config,
            prompts.analyst.clone(),
        ));
        let critic: Arc<dyn TextClassifier> = Arc::new(LlmClassifier::critic(
            provider,
            config,
            prompts.evaluator.clone(),
        ));
        let search: Arc<dyn SearchProvider> =
            Arc::new(GroundedSearch::new(Arc::clone(&worker), prompts.search.clone()));
        Ok(Self::new(search, worker, critic, config, prompts))
    }

    /// Iteration budget for the refinement loop.
    #[must_use]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Runs Deep Research for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidTarget`] for an empty or oversized
    /// name. Nothing after validation fails the run.
    pub async fn run(&self, target: &str) -> Result<ResearchReport, AgentError> {
        let target = ResearchTarget::new(target)?;
        let start = Instant::now();
        let tools = ResearchTools {
            search: self.search.as_ref(),
            worker: self.worker.as_ref(),
        };

        info!(company = %target, max_iterations = self.max_iterations, "deep research started");
        let mut state = RunState::new(target);
        let mut phase = Phase::Researching;

        let (outcome, iterations) = loop {
            phase = match phase {
                Phase::Researching => {
                    self.research(&mut state, tools).await;
                    if self.max_iterations == 0 {
                        Phase::Exhausted { iterations: 0 }
                    } else {
                        Phase::Evaluating { iteration: 1 }
                    }
                }
                Phase::Evaluating { iteration } => self.iterate(&mut state, iteration, tools).await,
                Phase::Escalated { iterations } => break (Outcome::Escalated, iterations),
                Phase::Exhausted { iterations } => break (Outcome::Exhausted, iterations),
            };
        };

        info!(
            company = %state.target,
            outcome = %outcome,
            iterations,
            enhanced_runs = state.enhanced_runs,
            searches = state.searches,
            errors = state.errors.len(),
            "deep research finished"
        );

        let plan = state
            .plan
            .take()
            .unwrap_or_else(|| ResearchPlan::standard(&state.target));
        Ok(ResearchReport {
            target: state.target.name().to_string(),
            plan,
            finding: state.finding,
            feedback: state.feedback,
            outcome,
            evaluations: state.evaluations,
            enhanced_runs: state.enhanced_runs,
            searches: state.searches,
            errors: state.errors.iter().map(ToString::to_string).collect(),
            elapsed_ms: start.elapsed().as_millis(),
        })
    }

    /// Planner and the initial researcher pass. Never retried.
    async fn research(&self, state: &mut RunState, tools: ResearchTools<'_>) {
        let planned = self.planner.plan(&state.target, tools).await;
        let plan = absorb(state, planned);
        let researched = self.researcher.research(&plan, tools).await;
        let finding = absorb(state, researched);
        state.finding = finding;
        state.plan = Some(plan);
        debug!(
            sections = state.finding.sections(),
            bytes = state.finding.len(),
            "initial finding ready"
        );
    }

    /// One evaluate/re-search cycle. Returns the next phase.
    async fn iterate(&self, state: &mut RunState, iteration: usize, tools: ResearchTools<'_>) -> Phase {
        let evaluated = self
            .evaluator
            .evaluate(&state.target, &state.finding, self.critic.as_ref())
            .await;
        let feedback = absorb(state, evaluated);
        state.evaluations += 1;
        debug!(iteration, grade = %feedback.grade, comment = %feedback.comment, "evaluated");

        if feedback.is_degenerate() {
            warn!(iteration, "failing evaluation without follow-up queries; finding will not change");
        }
        state.feedback = Some(feedback);

        if self.checker.check(state) == LoopSignal::Terminate {
            return Phase::Escalated { iterations: iteration };
        }

        if let Some(feedback) = state.feedback.as_ref() {
            let enhanced = self
                .enhanced
                .execute(&state.target, feedback, &mut state.finding, tools)
                .await;
            state.enhanced_runs += 1;
            let appended = absorb(state, enhanced);
            debug!(iteration, appended, "enhanced search applied");
        }

        if iteration >= self.max_iterations {
            Phase::Exhausted { iterations: iteration }
        } else {
            Phase::Evaluating { iteration: iteration + 1 }
        }
    }
}

/// Moves a stage's bookkeeping into the run state and returns its value.
fn absorb<T>(state: &mut RunState, out: StageOutput<T>) -> T {
    state.searches += out.searches;
    state.errors.extend(out.errors);
    out.value
}

impl std::fmt::Debug for ResearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchOrchestrator")
            .field("max_iterations", &self.max_iterations)
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}
