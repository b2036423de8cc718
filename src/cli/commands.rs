//! CLI command implementations.
//!
//! Every command returns its rendered output as a `String`; `main` writes
//! it to stdout. Async pipelines run on a runtime created per command.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::format_push_string)]

use std::path::Path;
use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info, warn};

use crate::agent::client::create_provider;
use crate::agent::{
    AgentConfig, GroundedSearch, LlmClassifier, PromptSet, ResearchOrchestrator, SearchProvider,
    TextClassifier,
};
use crate::analysis::{
    CompetitorAnalyzer, Domain, MarketAnalysis, MarketRequest, NewsMonitor, discover, render_table,
};
use crate::cli::output::{
    OutputFormat, format_history, format_hits, format_market, format_news, format_research,
    format_snapshots,
};
use crate::cli::parser::{Cli, Commands, PromptCommands};
use crate::error::{CommandError, Result};
use crate::storage::SqliteStore;

/// Report type recorded for Deep Research runs.
pub const DEEP_RESEARCH_REPORT: &str = "DEEP_RESEARCH";

/// Executes the parsed CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Research {
            company,
            max_iterations,
            worker_model,
            critic_model,
            prompt_dir,
            no_save,
        } => {
            let params = ResearchParams {
                company,
                max_iterations: *max_iterations,
                worker_model: worker_model.as_deref(),
                critic_model: critic_model.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
                save: !*no_save,
            };
            cmd_research(&db_path, &params, format)
        }
        Commands::Analyze {
            domain,
            own,
            competitors,
            detect_leaders,
            workers,
            no_save,
        } => {
            let request = MarketRequest {
                own: own.clone(),
                competitors: competitors.clone(),
                detect_leaders: *detect_leaders,
            };
            cmd_analyze(&db_path, domain, &request, *workers, !*no_save, format)
        }
        Commands::News { domain, entities } => cmd_news(&db_path, domain, entities, format),
        Commands::Discover {
            domain,
            location,
            year,
        } => cmd_discover(&db_path, domain, location, year.as_deref(), format),
        Commands::History { limit, report_type } => {
            cmd_history(&db_path, *limit, report_type.as_deref(), format)
        }
        Commands::Snapshots { entity, limit } => cmd_snapshots(&db_path, entity, *limit, format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
        Commands::Prompt(cmd) => cmd_prompt(&db_path, cmd, format),
    }
}

// ==================== Parameter Structs ====================

/// Parameters for the research command.
#[derive(Debug, Clone)]
pub struct ResearchParams<'a> {
    /// Company to research.
    pub company: &'a str,
    /// Iteration budget override.
    pub max_iterations: Option<usize>,
    /// Worker model override.
    pub worker_model: Option<&'a str>,
    /// Critic model override.
    pub critic_model: Option<&'a str>,
    /// Prompt directory override.
    pub prompt_dir: Option<&'a Path>,
    /// Whether to record the report.
    pub save: bool,
}

// ==================== Helpers ====================

fn open_store(db_path: &Path) -> Result<SqliteStore> {
    Ok(SqliteStore::open(db_path)?)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn parse_domain(domain: &str) -> Result<Domain> {
    Ok(domain.parse::<Domain>()?)
}

fn build_config(builder: crate::agent::config::AgentConfigBuilder) -> Result<AgentConfig> {
    builder.build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}")).into()
    })
}

/// Resolves prompts from disk, then applies overrides stored in the database.
fn resolve_prompts(store: &SqliteStore, config: &AgentConfig) -> Result<PromptSet> {
    let mut prompts = PromptSet::load(config.prompt_dir.as_deref());
    for (key, value) in store.prompts()? {
        if prompts.set(&key, value) {
            debug!(key = %key, "applied stored prompt override");
        } else {
            warn!(key = %key, "ignoring stored prompt with unknown key");
        }
    }
    Ok(prompts)
}

/// Wires the worker classifier and grounded search used by the market
/// commands.
fn market_collaborators(
    config: &AgentConfig,
    prompts: &PromptSet,
) -> Result<(Arc<dyn TextClassifier>, Arc<dyn SearchProvider>)> {
    let provider = create_provider(config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    let worker: Arc<dyn TextClassifier> =
        Arc::new(LlmClassifier::worker(provider, config, prompts.analyst.clone()));
    let search: Arc<dyn SearchProvider> =
        Arc::new(GroundedSearch::new(Arc::clone(&worker), prompts.search.clone()));
    Ok((worker, search))
}

// ==================== Research ====================

fn cmd_research(db_path: &Path, params: &ResearchParams<'_>, format: OutputFormat) -> Result<String> {
    let mut builder = AgentConfig::builder();
    if let Some(n) = params.max_iterations {
        builder = builder.max_iterations(n);
    }
    if let Some(model) = params.worker_model {
        builder = builder.worker_model(model);
    }
    if let Some(model) = params.critic_model {
        builder = builder.critic_model(model);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    let config = build_config(builder.from_env())?;

    let store = open_store(db_path)?;
    let prompts = resolve_prompts(&store, &config)?;
    let orchestrator = ResearchOrchestrator::with_prompts(&config, &prompts).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;

    info!(company = %params.company, budget = orchestrator.max_iterations(), "starting deep research");
    let report = runtime()?
        .block_on(orchestrator.run(params.company))
        .map_err(|e| CommandError::ExecutionFailed(format!("Research failed: {e}")))?;

    if params.save {
        let id = store.save_report(
            DEEP_RESEARCH_REPORT,
            &report.target,
            report.deep_research_text(),
            Some(&report),
        )?;
        debug!(id, "saved research report");
    }

    Ok(match format {
        OutputFormat::Text => format_research(&report),
        OutputFormat::Json => format.to_json(&report),
    })
}

// ==================== Market ====================

fn cmd_analyze(
    db_path: &Path,
    domain: &str,
    request: &MarketRequest,
    workers: Option<usize>,
    save: bool,
    format: OutputFormat,
) -> Result<String> {
    let domain = parse_domain(domain)?;
    if request.own.trim().is_empty() {
        return Err(CommandError::InvalidArgument("--own must not be empty".to_string()).into());
    }

    let mut builder = AgentConfig::builder();
    if let Some(n) = workers {
        builder = builder.max_workers(n);
    }
    let config = build_config(builder.from_env())?;

    let store = open_store(db_path)?;
    let prompts = resolve_prompts(&store, &config)?;
    let (worker, search) = market_collaborators(&config, &prompts)?;

    let analyzer = Arc::new(CompetitorAnalyzer::new(
        search,
        Arc::clone(&worker),
        domain,
        prompts.market.clone(),
    ));
    let analysis = MarketAnalysis::new(analyzer, worker, config.max_workers);

    info!(domain = %domain, own = %request.own, workers = config.max_workers, "starting market analysis");
    let report = runtime()?.block_on(analysis.run(request));

    if save {
        store.save_report(
            domain.report_type(),
            &report.own,
            &render_table(&report.records),
            Some(&report),
        )?;
        for record in &report.records {
            store.save_snapshot(domain, record)?;
        }
        debug!(records = report.records.len(), "saved market report and snapshots");
    }

    Ok(match format {
        OutputFormat::Text => format_market(&report),
        OutputFormat::Json => format.to_json(&report),
    })
}

fn cmd_news(db_path: &Path, domain: &str, entities: &[String], format: OutputFormat) -> Result<String> {
    let domain = parse_domain(domain)?;
    let config = build_config(AgentConfig::builder().from_env())?;
    let store = open_store(db_path)?;
    let prompts = resolve_prompts(&store, &config)?;
    let (_, search) = market_collaborators(&config, &prompts)?;

    let monitor = NewsMonitor::new(search);
    let items = runtime()?.block_on(monitor.scan(domain, entities));

    Ok(match format {
        OutputFormat::Text => format_news(&items),
        OutputFormat::Json => format.to_json(&items),
    })
}

fn cmd_discover(
    db_path: &Path,
    domain: &str,
    location: &str,
    year: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let domain = parse_domain(domain)?;
    let year = year.map_or_else(|| chrono::Utc::now().year().to_string(), String::from);
    let config = build_config(AgentConfig::builder().from_env())?;
    let store = open_store(db_path)?;
    let prompts = resolve_prompts(&store, &config)?;
    let (_, search) = market_collaborators(&config, &prompts)?;

    let hits = runtime()?.block_on(discover(search.as_ref(), domain, location, &year));

    Ok(match format {
        OutputFormat::Text => format!(
            "{} players in {} ({})\n\n{}",
            domain.profile().label,
            location,
            year,
            format_hits(&hits)
        ),
        OutputFormat::Json => format.to_json(&hits),
    })
}

// ==================== History ====================

fn cmd_history(
    db_path: &Path,
    limit: usize,
    report_type: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let store = open_store(db_path)?;
    let entries = store.history(limit, report_type)?;

    Ok(match format {
        OutputFormat::Text => format_history(&entries),
        OutputFormat::Json => format.to_json(&entries),
    })
}

fn cmd_snapshots(db_path: &Path, entity: &str, limit: usize, format: OutputFormat) -> Result<String> {
    let store = open_store(db_path)?;
    let entries = store.snapshots(entity, limit)?;

    Ok(match format {
        OutputFormat::Text => format_snapshots(&entries),
        OutputFormat::Json => format.to_json(&entries),
    })
}

// ==================== Prompts ====================

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(std::path::PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str(&format!(
                        "  {}\n",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    ));
                }
                output.push_str("\nEdit these files to customize agent prompts.\n");
                Ok(output)
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len(),
            });
            Ok(format.to_json(&json))
        }
    }
}

fn validate_prompt_key(key: &str) -> Result<()> {
    if PromptSet::KEYS.contains(&key) {
        Ok(())
    } else {
        Err(CommandError::InvalidArgument(format!(
            "unknown prompt key '{key}' (expected one of: {})",
            PromptSet::KEYS.join(", ")
        ))
        .into())
    }
}

fn cmd_prompt(db_path: &Path, cmd: &PromptCommands, format: OutputFormat) -> Result<String> {
    match cmd {
        PromptCommands::Get { key } => {
            validate_prompt_key(key)?;
            let store = open_store(db_path)?;
            let stored = store.get_prompt(key)?;
            let overridden = stored.is_some();
            let value = match stored {
                Some(value) => value,
                None => PromptSet::defaults().get(key).unwrap_or_default().to_string(),
            };
            Ok(match format {
                OutputFormat::Text => format!("{value}\n"),
                OutputFormat::Json => format.to_json(&serde_json::json!({
                    "key": key,
                    "value": value,
                    "overridden": overridden,
                })),
            })
        }
        PromptCommands::Set { key, value } => {
            validate_prompt_key(key)?;
            if value.trim().is_empty() {
                return Err(
                    CommandError::InvalidArgument("prompt value must not be empty".to_string()).into(),
                );
            }
            let store = open_store(db_path)?;
            store.save_prompt(key, value)?;
            Ok(match format {
                OutputFormat::Text => format!("Saved prompt '{key}'\n"),
                OutputFormat::Json => {
                    format.to_json(&serde_json::json!({ "key": key, "saved": true }))
                }
            })
        }
        PromptCommands::List => {
            let store = open_store(db_path)?;
            let prompts = store.prompts()?;
            Ok(match format {
                OutputFormat::Text if prompts.is_empty() => "No stored prompt overrides.\n".to_string(),
                OutputFormat::Text => {
                    let mut output = String::new();
                    for (key, value) in &prompts {
                        let first = value.lines().next().unwrap_or_default();
                        output.push_str(&format!("{key:<10} {first}\n"));
                    }
                    output
                }
                OutputFormat::Json => {
                    let map: serde_json::Map<String, serde_json::Value> = prompts
                        .into_iter()
                        .map(|(k, v)| (k, serde_json::Value::String(v)))
                        .collect();
                    format.to_json(&map)
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(db: &Path, format: &str, command: Commands) -> Cli {
        Cli {
            db_path: Some(db.to_path_buf()),
            verbose: false,
            format: format.to_string(),
            command,
        }
    }

    #[test]
    fn test_history_empty_database() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = dir.path().join("intel.db");
        let out = execute(&cli(
            &db,
            "text",
            Commands::History {
                limit: 5,
                report_type: None,
            },
        ))
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(out, "No reports saved.\n");
        assert!(db.exists());
    }

    #[test]
    fn test_prompt_set_then_get() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = dir.path().join("intel.db");
        let set = Commands::Prompt(PromptCommands::Set {
            key: "planner".to_string(),
            value: "Plan carefully.".to_string(),
        });
        execute(&cli(&db, "text", set)).unwrap_or_else(|_| unreachable!());

        let get = Commands::Prompt(PromptCommands::Get {
            key: "planner".to_string(),
        });
        let out = execute(&cli(&db, "json", get)).unwrap_or_else(|_| unreachable!());
        let value: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        assert_eq!(value["value"], "Plan carefully.");
        assert_eq!(value["overridden"], true);
    }

    #[test]
    fn test_prompt_get_falls_back_to_default() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = dir.path().join("intel.db");
        let get = Commands::Prompt(PromptCommands::Get {
            key: "search".to_string(),
        });
        let out = execute(&cli(&db, "text", get)).unwrap_or_else(|_| unreachable!());
        assert!(out.contains("JSON array"));
    }

    #[test]
    fn test_prompt_unknown_key_rejected() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = dir.path().join("intel.db");
        let get = Commands::Prompt(PromptCommands::Get {
            key: "nope".to_string(),
        });
        let err = execute(&cli(&db, "text", get)).err();
        assert!(err.is_some_and(|e| e.to_string().contains("unknown prompt key")));
    }

    #[test]
    fn test_invalid_domain_rejected_before_configuration() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let db = dir.path().join("intel.db");
        let cmd = Commands::Discover {
            domain: "retail".to_string(),
            location: "Spain".to_string(),
            year: None,
        };
        let err = execute(&cli(&db, "text", cmd)).err();
        assert!(err.is_some_and(|e| e.to_string().contains("invalid argument")));
        assert!(!db.exists());
    }

    #[test]
    fn test_init_prompts_writes_then_skips() {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let first = cmd_init_prompts(Some(dir.path()), OutputFormat::Text).unwrap_or_default();
        assert!(first.starts_with("Wrote 8 prompt template(s)"));
        let second = cmd_init_prompts(Some(dir.path()), OutputFormat::Text).unwrap_or_default();
        assert!(second.starts_with("All prompt templates already exist"));
    }

    #[test]
    fn test_resolve_prompts_applies_overrides() {
        let store = SqliteStore::in_memory().unwrap_or_else(|_| unreachable!());
        store.save_prompt("market", "Custom market prompt").unwrap_or_else(|_| unreachable!());
        let config = AgentConfig::builder()
            .api_key("test")
            .prompt_dir(std::env::temp_dir().join("deep-intel-no-such-dir"))
            .build()
            .unwrap_or_else(|_| unreachable!());
        let prompts = resolve_prompts(&store, &config).unwrap_or_else(|_| unreachable!());
        assert_eq!(prompts.market, "Custom market prompt");
        assert_eq!(prompts.planner, PromptSet::defaults().planner);
    }
}
