//! Research targets and plans.
//!
//! A plan always has the same four phases: three investigation phases
//! (strategy, product, reputation) followed by one deliverable phase. The
//! planner may attach model-drafted notes but never changes the shape.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Maximum accepted target name length in bytes.
const MAX_TARGET_LEN: usize = 200;

/// The company under investigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchTarget(String);

impl ResearchTarget {
    /// Validates and wraps a company name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidTarget`] when the name is blank or
    /// unreasonably long.
    pub fn new(name: &str) -> Result<Self, AgentError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AgentError::InvalidTarget {
                message: "target name cannot be empty".to_string(),
            });
        }
        if trimmed.len() > MAX_TARGET_LEN {
            return Err(AgentError::InvalidTarget {
                message: format!(
                    "target name exceeds maximum length ({} bytes, max {MAX_TARGET_LEN})",
                    trimmed.len()
                ),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the company name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResearchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three investigation dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Market moves, partnerships, acquisitions, pricing.
    Strategy,
    /// Product launches, technology stack, roadmap.
    Product,
    /// Employee and customer sentiment from social sources.
    Reputation,
}

impl Dimension {
    /// All dimensions in plan order.
    pub const ALL: [Self; 3] = [Self::Strategy, Self::Product, Self::Reputation];

    /// Short human title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Strategy => "Strategy and market moves",
            Self::Product => "Product and technology",
            Self::Reputation => "Reputation and feedback",
        }
    }

    /// Directive text telling the researcher what to look for.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Strategy => {
                "Investigate recent strategic moves: acquisitions, partnerships, \
                 market expansion, pricing changes and leadership announcements."
            }
            Self::Product => {
                "Investigate the product portfolio and technology: recent launches, \
                 platform capabilities, integrations, AI features and roadmap signals."
            }
            Self::Reputation => {
                "Investigate reputation: search Reddit, Glassdoor, Twitter/X, LinkedIn \
                 and industry forums for employee and customer opinions and recurring complaints."
            }
        }
    }

    /// Deterministic queries used when query generation fails.
    #[must_use]
    pub fn fallback_queries(self, target: &ResearchTarget) -> Vec<String> {
        let name = target.name();
        match self {
            Self::Strategy => vec![
                format!("{name} acquisition partnership announcement"),
                format!("{name} market expansion strategy"),
                format!("{name} pricing changes"),
                format!("{name} leadership news"),
            ],
            Self::Product => vec![
                format!("{name} new product launch"),
                format!("{name} platform features integrations"),
                format!("{name} AI technology roadmap"),
                format!("{name} product review"),
            ],
            Self::Reputation => vec![
                format!("{name} reviews reddit"),
                format!("{name} glassdoor employee reviews"),
                format!("{name} customer complaints twitter"),
                format!("{name} linkedin forum opinions"),
            ],
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Strategy => "strategy",
            Self::Product => "product",
            Self::Reputation => "reputation",
        })
    }
}

/// Whether a phase gathers information or produces the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    /// Searches and summarizes one dimension.
    Investigation,
    /// Compiles the report from accumulated findings.
    Deliverable,
}

/// A single step of a [`ResearchPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPhase {
    /// Investigation or deliverable.
    pub kind: PhaseKind,
    /// Dimension covered, set only for investigation phases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    /// Short title.
    pub title: String,
    /// What to investigate or produce.
    pub directive: String,
}

/// Ordered phases for one research run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchPlan {
    target: ResearchTarget,
    phases: Vec<PlanPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl ResearchPlan {
    /// Builds the standard four-phase plan for `target`.
    #[must_use]
    pub fn standard(target: &ResearchTarget) -> Self {
        let mut phases: Vec<PlanPhase> = Dimension::ALL
            .iter()
            .map(|&d| PlanPhase {
                kind: PhaseKind::Investigation,
                dimension: Some(d),
                title: d.title().to_string(),
                directive: d.directive().to_string(),
            })
            .collect();
        phases.push(PlanPhase {
            kind: PhaseKind::Deliverable,
            dimension: None,
            title: "Report".to_string(),
            directive: format!(
                "Compile a structured competitive intelligence report on {target} \
                 using only the accumulated findings."
            ),
        });
        Self {
            target: target.clone(),
            phases,
            notes: None,
        }
    }

    /// Attaches planner notes, discarding blank text.
    #[must_use]
    pub fn with_notes(mut self, notes: &str) -> Self {
        let trimmed = notes.trim();
        self.notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Returns the research target.
    #[must_use]
    pub const fn target(&self) -> &ResearchTarget {
        &self.target
    }

    /// Returns all phases in order.
    #[must_use]
    pub fn phases(&self) -> &[PlanPhase] {
        &self.phases
    }

    /// Returns planner notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Iterates over the investigation phases.
    pub fn investigations(&self) -> impl Iterator<Item = &PlanPhase> {
        self.phases
            .iter()
            .filter(|p| p.kind == PhaseKind::Investigation)
    }

    /// Returns the deliverable phase.
    #[must_use]
    pub fn deliverable(&self) -> Option<&PlanPhase> {
        self.phases.iter().find(|p| p.kind == PhaseKind::Deliverable)
    }

    /// Renders the plan as a markdown list.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (idx, phase) in self.phases.iter().enumerate() {
            let tag = match phase.kind {
                PhaseKind::Investigation => "investigation",
                PhaseKind::Deliverable => "deliverable",
            };
            let _ = writeln!(
                out,
                "{}. [{tag}] {}: {}",
                idx + 1,
                phase.title,
                phase.directive
            );
        }
        if let Some(notes) = &self.notes {
            let _ = write!(out, "\nPlanner notes:\n{notes}\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> ResearchTarget {
        ResearchTarget::new("Acme Corp").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_target_validation() {
        assert!(ResearchTarget::new("   ").is_err());
        assert!(ResearchTarget::new(&"x".repeat(MAX_TARGET_LEN + 1)).is_err());
        assert_eq!(acme().name(), "Acme Corp");
        let padded = ResearchTarget::new("  Acme  ").unwrap_or_else(|_| unreachable!());
        assert_eq!(padded.name(), "Acme");
    }

    #[test]
    fn test_standard_plan_shape() {
        let plan = ResearchPlan::standard(&acme());
        assert_eq!(plan.phases().len(), 4);
        assert_eq!(plan.investigations().count(), 3);
        let dims: Vec<_> = plan.investigations().filter_map(|p| p.dimension).collect();
        assert_eq!(dims, Dimension::ALL.to_vec());
        let last = plan.phases().last().map(|p| p.kind);
        assert_eq!(last, Some(PhaseKind::Deliverable));
        assert!(plan.deliverable().is_some_and(|p| p.directive.contains("Acme Corp")));
    }

    #[test]
    fn test_reputation_names_social_sources() {
        let directive = Dimension::Reputation.directive();
        for source in ["Reddit", "Glassdoor", "Twitter/X", "LinkedIn", "forums"] {
            assert!(directive.contains(source), "missing {source}");
        }
    }

    #[test]
    fn test_render_includes_notes() {
        let plan = ResearchPlan::standard(&acme()).with_notes("Focus on EMEA.");
        let text = plan.render();
        assert!(text.starts_with("1. [investigation] Strategy and market moves"));
        assert!(text.contains("4. [deliverable] Report"));
        assert!(text.contains("Focus on EMEA."));
        assert!(ResearchPlan::standard(&acme()).with_notes("  ").notes().is_none());
    }

    #[test]
    fn test_fallback_queries_mention_target() {
        for d in Dimension::ALL {
            let queries = d.fallback_queries(&acme());
            assert_eq!(queries.len(), 4);
            assert!(queries.iter().all(|q| q.starts_with("Acme Corp ")));
        }
    }
}
