//! # deep-intel
//!
//! Competitive intelligence research with LLM-grounded web search.
//!
//! The centerpiece is Deep Research: a bounded plan, research and critique
//! loop that keeps refining its findings on a company until an evaluator
//! grades them as complete or the iteration budget runs out. Alongside it
//! sits a market analysis that scores a set of competitors in parallel on
//! visibility, sentiment and topic.
//!
//! ## Layers
//!
//! - [`core`]: plain data model (targets, plans, findings, feedback).
//! - [`agent`]: LLM providers and the Deep Research pipeline.
//! - [`analysis`]: domain profiles, competitor scoring and the worker pool.
//! - [`storage`]: `SQLite` report history, prompt overrides and snapshots.
//! - [`cli`]: the `deep-intel` command-line front end.
//!
//! ## Example
//!
//! ```no_run
//! use deep_intel::agent::{AgentConfig, ResearchOrchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfig::from_env()?;
//! let orchestrator = ResearchOrchestrator::from_config(&config)?;
//! let report = orchestrator.run("Acme Corp").await?;
//! println!("{}", report.deep_research_text());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod core;
pub mod error;
pub mod storage;

pub use agent::{ResearchOrchestrator, ResearchReport};
pub use error::{Error, Result};
