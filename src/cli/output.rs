//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::Serialize;

use crate::agent::ResearchReport;
use crate::analysis::{MarketReport, NewsItem, render_table};
use crate::core::SearchHit;
use crate::storage::{ReportEntry, SnapshotEntry};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name. Unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}\n"))
    }
}

/// Formats a Deep Research report: the finding followed by a run summary.
#[must_use]
pub fn format_research(report: &ResearchReport) -> String {
    let mut out = report.deep_research_text().to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    let _ = write!(
        out,
        "\n---\nOutcome: {} | Evaluations: {} | Enhanced searches: {} | Searches: {} | Time: {:.1}s\n",
        report.outcome,
        report.evaluations,
        report.enhanced_runs,
        report.searches,
        millis_to_secs(report.elapsed_ms),
    );
    if let Some(feedback) = &report.feedback
        && !feedback.comment.is_empty()
    {
        let _ = writeln!(out, "Last evaluation ({}): {}", feedback.grade, feedback.comment);
    }
    for err in &report.errors {
        let _ = writeln!(out, "Recovered: {err}");
    }
    out
}

/// Formats a market analysis as a table plus notes.
#[must_use]
pub fn format_market(report: &MarketReport) -> String {
    let mut out = format!("Market analysis for {}\n\n", report.own);
    out.push_str(&render_table(&report.records));
    if !report.leaders_detected.is_empty() {
        let _ = writeln!(out, "\nDetected leaders: {}", report.leaders_detected.join(", "));
    }
    for record in report.records.iter().filter(|r| !r.notes.is_empty()) {
        let _ = writeln!(out, "Note ({}): {}", record.entity, record.notes.join("; "));
    }
    for err in &report.errors {
        let _ = writeln!(out, "Error: {err}");
    }
    let _ = writeln!(out, "\nTime: {:.1}s", millis_to_secs(report.elapsed_ms));
    out
}

/// Formats news items grouped in scan order.
#[must_use]
pub fn format_news(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return "No news found.\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "[{}] {}", item.entity, item.title);
        if !item.url.is_empty() {
            let _ = writeln!(out, "  {}", item.url);
        }
        if !item.snippet.is_empty() {
            let _ = writeln!(out, "  {}", item.snippet);
        }
    }
    out
}

/// Formats discovery hits as a bullet list.
#[must_use]
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results.\n".to_string();
    }
    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(out, "{}", hit.to_bullet());
    }
    out
}

/// Formats report history as one line per report.
#[must_use]
pub fn format_history(entries: &[ReportEntry]) -> String {
    if entries.is_empty() {
        return "No reports saved.\n".to_string();
    }
    let mut out = String::new();
    for e in entries {
        let first_line = e.content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let _ = writeln!(
            out,
            "#{:<4} {}  {:<18} {:<24} {}",
            e.id,
            e.timestamp,
            e.report_type,
            e.target_entity,
            first_line.trim()
        );
    }
    out
}

/// Formats competitor snapshots as a markdown table.
#[must_use]
pub fn format_snapshots(entries: &[SnapshotEntry]) -> String {
    if entries.is_empty() {
        return "No snapshots saved.\n".to_string();
    }
    let mut out = String::from("| Date | Domain | Visibility | Sentiment | Topic | Source |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for e in entries {
        let sentiment = if e.simulated {
            format!("{} (simulated)", e.sentiment)
        } else {
            e.sentiment.clone()
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            e.timestamp, e.domain, e.visibility, sentiment, e.topic, e.top_source
        );
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn millis_to_secs(ms: u128) -> f64 {
    ms as f64 / 1000.0
}
