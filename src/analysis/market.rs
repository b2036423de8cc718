//! Market analysis run: target list, fan-out, ranking.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use super::competitor::{CompetitorAnalyzer, CompetitorRecord, EntityKind, MarketTarget};
use super::discovery::detect_leaders;
use super::pool::run_pool;
use crate::agent::classifier::TextClassifier;

/// What to analyze in one run.
#[derive(Debug, Clone, Default)]
pub struct MarketRequest {
    /// The user's company.
    pub own: String,
    /// Configured competitors.
    pub competitors: Vec<String>,
    /// Ask the model for market leaders and add them.
    pub detect_leaders: bool,
}

/// Output of a market analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct MarketReport {
    /// Own company.
    pub own: String,
    /// Records ranked own-first, then by visibility.
    pub records: Vec<CompetitorRecord>,
    /// Names added by leader detection.
    pub leaders_detected: Vec<String>,
    /// Failures that did not stop the run.
    pub errors: Vec<String>,
    /// Wall time in milliseconds.
    pub elapsed_ms: u128,
}

/// Fans one [`CompetitorAnalyzer`] out over a target list.
pub struct MarketAnalysis {
    analyzer: Arc<CompetitorAnalyzer>,
    classifier: Arc<dyn TextClassifier>,
    workers: usize,
}

impl MarketAnalysis {
    /// Creates a run with at most `workers` concurrent analyses.
    #[must_use]
    pub fn new(analyzer: Arc<CompetitorAnalyzer>, classifier: Arc<dyn TextClassifier>, workers: usize) -> Self {
        Self {
            analyzer,
            classifier,
            workers,
        }
    }

    /// Analyzes own company, competitors and optionally detected leaders.
    pub async fn run(&self, request: &MarketRequest) -> MarketReport {
        let start = Instant::now();
        let domain = self.analyzer.domain();
        let mut errors = Vec::new();

        let mut leaders = Vec::new();
        if request.detect_leaders {
            match detect_leaders(self.classifier.as_ref(), domain, &request.own, &request.competitors).await {
                Ok(found) => leaders = found,
                Err(e) => {
                    warn!(error = %e, "leader detection failed; continuing with the configured list");
                    errors.push(e.to_string());
                }
            }
        }

        let targets = build_targets(&request.own, &request.competitors, &leaders);
        info!(domain = %domain, targets = targets.len(), workers = self.workers, "market analysis started");

        let analyzer = Arc::clone(&self.analyzer);
        let results = run_pool(targets, self.workers, move |target: MarketTarget| {
            let analyzer = Arc::clone(&analyzer);
            async move { analyzer.analyze(&target).await }
        })
        .await;

        let mut records = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => errors.push(e.to_string()),
            }
        }
        rank(&mut records);

        MarketReport {
            own: request.own.clone(),
            records,
            leaders_detected: leaders,
            errors,
            elapsed_ms: start.elapsed().as_millis(),
        }
    }
}

impl std::fmt::Debug for MarketAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketAnalysis")
            .field("analyzer", &self.analyzer)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// Own company first, then competitors and extras in order, without
/// case-insensitive duplicates or blanks.
#[must_use]
pub fn build_targets(own: &str, competitors: &[String], extras: &[String]) -> Vec<MarketTarget> {
    let mut targets = vec![MarketTarget::own(own.trim())];
    let mut seen = vec![own.trim().to_lowercase()];
    for name in competitors.iter().chain(extras).map(|n| n.trim()) {
        let key = name.to_lowercase();
        if name.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        targets.push(MarketTarget::competitor(name));
    }
    targets
}

/// Sorts own-first, then by visibility descending, then by name.
pub fn rank(records: &mut [CompetitorRecord]) {
    records.sort_by(|a, b| {
        (b.kind == EntityKind::Own)
            .cmp(&(a.kind == EntityKind::Own))
            .then_with(|| b.visibility.cmp(&a.visibility))
            .then_with(|| a.entity.cmp(&b.entity))
    });
}

/// Renders records as a markdown table.
#[must_use]
pub fn render_table(records: &[CompetitorRecord]) -> String {
    let mut out = String::from(
        "| Entity | Type | Visibility | Sentiment | Topic | Top source |\n\
         |--------|------|-----------:|-----------|-------|------------|\n",
    );
    for r in records {
        let marker = if r.simulated { " (simulated)" } else { "" };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {}{marker} | {} | {} |",
            r.entity,
            r.kind.as_str(),
            r.visibility,
            r.sentiment,
            r.topic,
            r.top_source
        );
    }
    out
}
