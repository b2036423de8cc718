//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// deep-intel: competitive intelligence research from the command line.
///
/// Runs the Deep Research refinement loop on a company, analyzes a market
/// of competitors in parallel, and keeps a local history of reports.
#[derive(Parser, Debug)]
#[command(name = "deep-intel")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the report database.
    ///
    /// Defaults to `.intel/intel.db` in the current directory.
    #[arg(short, long, env = "INTEL_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output (debug logging on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run Deep Research on one company.
    ///
    /// Plans the research, searches each dimension, then evaluates and
    /// re-searches until the findings pass or the iteration budget runs out.
    #[command(after_help = r#"Examples:
  deep-intel research "Acme Corp"                       # Default budget (3 iterations)
  deep-intel research "Acme Corp" --max-iterations 5    # Allow more refinement
  deep-intel research "Acme Corp" --critic-model gpt-4o # Pick the grading model
  deep-intel --format json research "Acme Corp" | jq '.outcome'
"#)]
    Research {
        /// Company to research.
        company: String,

        /// Maximum evaluate/re-search iterations.
        #[arg(long, env = "INTEL_MAX_ITERATIONS")]
        max_iterations: Option<usize>,

        /// Model for planning, summaries and search.
        #[arg(long, env = "INTEL_WORKER_MODEL")]
        worker_model: Option<String>,

        /// Model for grading findings.
        #[arg(long, env = "INTEL_CRITIC_MODEL")]
        critic_model: Option<String>,

        /// Directory containing prompt template files.
        #[arg(long, env = "INTEL_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,

        /// Do not record the report in the history.
        #[arg(long)]
        no_save: bool,
    },

    /// Analyze a market: own company plus competitors, in parallel.
    #[command(after_help = r#"Examples:
  deep-intel analyze --domain payroll --own Acme -c Globex -c Initech
  deep-intel analyze --domain hr --own Acme --detect-leaders --workers 8
"#)]
    Analyze {
        /// Market domain (hr, financial, payroll, bpo).
        #[arg(long)]
        domain: String,

        /// Your company.
        #[arg(long)]
        own: String,

        /// Competitor to include (repeatable).
        #[arg(short, long = "competitor")]
        competitors: Vec<String>,

        /// Ask the model for market leaders and add them.
        #[arg(long)]
        detect_leaders: bool,

        /// Concurrent analyses.
        #[arg(short, long, env = "INTEL_MAX_WORKERS")]
        workers: Option<usize>,

        /// Do not record the report and snapshots.
        #[arg(long)]
        no_save: bool,
    },

    /// Scan recent news for one or more entities.
    News {
        /// Market domain (hr, financial, payroll, bpo).
        #[arg(long)]
        domain: String,

        /// Entities to scan.
        #[arg(required = true)]
        entities: Vec<String>,
    },

    /// Search for market players in a domain.
    Discover {
        /// Market domain (hr, financial, payroll, bpo).
        #[arg(long)]
        domain: String,

        /// Geographic scope.
        #[arg(long, default_value = "Spain")]
        location: String,

        /// Year to rank.
        #[arg(long)]
        year: Option<String>,
    },

    /// List saved reports, newest first.
    History {
        /// Maximum reports to show.
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Only show this report type (e.g. `DEEP_RESEARCH`).
        #[arg(short = 't', long)]
        report_type: Option<String>,
    },

    /// Show stored competitor snapshots for one entity, newest first.
    Snapshots {
        /// Entity name (case-insensitive).
        entity: String,

        /// Maximum snapshots to show.
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Write default prompt templates to a directory.
    ///
    /// Existing files are not overwritten.
    #[command(after_help = r#"Examples:
  deep-intel init-prompts                 # ~/.config/deep-intel/prompts
  deep-intel init-prompts ./prompts       # Custom directory
"#)]
    InitPrompts {
        /// Target directory.
        dir: Option<PathBuf>,
    },

    /// Stored prompt overrides (get, set, list).
    #[command(subcommand)]
    Prompt(PromptCommands),
}

/// Prompt override subcommands.
#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Show the effective prompt for a key.
    Get {
        /// Prompt key (analyst, evaluator, planner, queries, summary, report, search, market).
        key: String,
    },

    /// Store an override for a key.
    Set {
        /// Prompt key.
        key: String,

        /// New prompt text.
        value: String,
    },

    /// List stored overrides.
    List,
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_db_path() {
        let cli = Cli {
            db_path: None,
            verbose: false,
            format: "text".to_string(),
            command: Commands::History {
                limit: 20,
                report_type: None,
            },
        };
        assert_eq!(
            cli.get_db_path(),
            PathBuf::from(crate::storage::DEFAULT_DB_PATH)
        );
    }

    #[test]
    fn test_parse_analyze_competitors() {
        let cli = Cli::try_parse_from([
            "deep-intel", "analyze", "--domain", "payroll", "--own", "Acme", "-c", "Globex", "-c", "Initech",
        ])
        .unwrap_or_else(|_| unreachable!());
        match cli.command {
            Commands::Analyze { competitors, .. } => assert_eq!(competitors, vec!["Globex", "Initech"]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_news_requires_entities() {
        assert!(Cli::try_parse_from(["deep-intel", "news", "--domain", "hr"]).is_err());
    }
}
