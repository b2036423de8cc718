//! CLI layer for deep-intel.
//!
//! Provides the command-line interface using clap: Deep Research, market
//! analysis, news and discovery, plus report history and prompt overrides.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, PromptCommands};
