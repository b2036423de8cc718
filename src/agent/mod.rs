//! Deep Research agents.
//!
//! LLM plumbing (provider abstraction over OpenAI-compatible APIs, retrying
//! classifier, grounded search) and the bounded refinement pipeline built
//! on top of it.
//!
//! # Architecture
//!
//! ```text
//! Company name → ResearchOrchestrator
//!   ├── ResearchPlanner (fixed 4-phase plan + model notes)
//!   ├── SectionResearcher (3-4 queries per phase → summarized sections)
//!   └── bounded loop, at most max_iterations times:
//!       ├── ResearchEvaluator (pass | fail + follow-up queries)
//!       ├── EscalationChecker (pass → stop)
//!       └── EnhancedSearchExecutor (append follow-up sections)
//! ```
//!
//! Every stage degrades instead of failing; recovered errors are carried
//! on [`StageOutput`] and end up on the [`ResearchReport`].

pub mod classifier;
pub mod client;
pub mod config;
pub mod enhanced;
pub mod escalation;
pub mod evaluator;
pub mod message;
pub mod orchestrator;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod researcher;
pub mod search;
pub mod stage;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{LlmClassifier, TextClassifier};
pub use config::AgentConfig;
pub use enhanced::EnhancedSearchExecutor;
pub use escalation::{EscalationChecker, LoopSignal};
pub use evaluator::ResearchEvaluator;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{Outcome, Phase, ResearchOrchestrator, ResearchReport};
pub use planner::ResearchPlanner;
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use researcher::SectionResearcher;
pub use search::{GroundedSearch, SearchProvider};
pub use stage::{ResearchTools, StageOutput};
pub use state::RunState;
