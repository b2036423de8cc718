//! Market domains and their search vocabulary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// Market covered by a competitive analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// HR consulting and talent management.
    Hr,
    /// Financial consulting, audit and ESG.
    Financial,
    /// Payroll software and outsourcing.
    Payroll,
    /// Accounting and tax process outsourcing.
    Bpo,
}

impl Domain {
    /// All domains.
    pub const ALL: [Self; 4] = [Self::Hr, Self::Financial, Self::Payroll, Self::Bpo];

    /// Lowercase identifier used on the command line and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hr => "hr",
            Self::Financial => "financial",
            Self::Payroll => "payroll",
            Self::Bpo => "bpo",
        }
    }

    /// Report type recorded for market analyses in this domain.
    #[must_use]
    pub const fn report_type(self) -> &'static str {
        match self {
            Self::Hr => "MARKET_HR",
            Self::Financial => "MARKET_FINANCIAL",
            Self::Payroll => "MARKET_PAYROLL",
            Self::Bpo => "MARKET_BPO",
        }
    }

    /// Search vocabulary for the domain.
    #[must_use]
    pub fn profile(self) -> &'static DomainProfile {
        match self {
            Self::Hr => &HR,
            Self::Financial => &FINANCIAL,
            Self::Payroll => &PAYROLL,
            Self::Bpo => &BPO,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hr" | "talent" => Ok(Self::Hr),
            "financial" | "fin" | "finance" => Ok(Self::Financial),
            "payroll" => Ok(Self::Payroll),
            "bpo" => Ok(Self::Bpo),
            other => Err(CommandError::InvalidArgument(format!(
                "unknown domain '{other}' (expected hr, financial, payroll or bpo)"
            ))),
        }
    }
}

/// Static search vocabulary for one [`Domain`].
///
/// Templates use `{name}` as the entity placeholder.
#[derive(Debug)]
pub struct DomainProfile {
    /// Human-readable label.
    pub label: &'static str,
    /// Sector phrase used by market discovery.
    pub sector: &'static str,
    /// Queries run for every analyzed competitor.
    pub search_templates: [&'static str; 5],
    /// Queries run by the news monitor.
    pub news_templates: [&'static str; 3],
    /// Placeholder snippets used when search returns nothing.
    pub simulated_templates: [&'static str; 3],
    /// Topic vocabulary offered to the sentiment classifier.
    pub topics: &'static [&'static str],
    /// Prompt asking the model for market leaders.
    pub leader_prompt: &'static str,
}

impl DomainProfile {
    /// Renders the competitor search queries for `name`.
    #[must_use]
    pub fn search_queries(&self, name: &str) -> Vec<String> {
        render(&self.search_templates, name)
    }

    /// Renders the news queries for `name`.
    #[must_use]
    pub fn news_queries(&self, name: &str) -> Vec<String> {
        render(&self.news_templates, name)
    }

    /// Renders the simulated fallback snippets for `name`.
    #[must_use]
    pub fn simulated_snippets(&self, name: &str) -> Vec<String> {
        render(&self.simulated_templates, name)
    }
}

fn render(templates: &[&str], name: &str) -> Vec<String> {
    templates.iter().map(|t| t.replace("{name}", name)).collect()
}

static HR: DomainProfile = DomainProfile {
    label: "HR consulting and talent management",
    sector: "HR consulting and talent management",
    search_templates: [
        "{name} HR consulting talent leadership",
        "{name} corporate wellbeing workplace climate services",
        "{name} performance evaluation career plans competencies",
        "{name} compensation benefits salary studies",
        "{name} organizational process reengineering case studies",
    ],
    news_templates: [
        "{name} HR talent news launch leadership",
        "{name} acquisition partnership HR consulting",
        "{name} workplace wellbeing program announcement",
    ],
    simulated_templates: [
        "{name} expands its corporate wellbeing service catalogue.",
        "New partnerships for {name} in talent and leadership consulting.",
        "Mixed opinions on how {name} implements process reengineering.",
    ],
    topics: &["Talent", "Leadership", "Wellbeing", "Compensation", "Reengineering", "Expansion"],
    leader_prompt: "List the 3 leading HR and talent management consultancies in the market, including local and mid-market firms. Names only, separated by commas.",
};

static FINANCIAL: DomainProfile = DomainProfile {
    label: "Financial consulting and audit",
    sector: "financial consulting audit ESG due diligence",
    search_templates: [
        "{name} financial consulting internal audit",
        "{name} ESG sustainability reporting regulation",
        "{name} financial due diligence valuations M&A",
        "{name} ERP implementation interim financial controller",
        "{name} financial statement consolidation viability plans",
    ],
    news_templates: [
        "{name} new financial consulting service launch",
        "{name} acquisition merger alliance audit partnership",
        "{name} ESG sustainability CSRD regulatory change",
    ],
    simulated_templates: [
        "{name} strengthens its internal audit and compliance division.",
        "New alliances for {name} in ESG sustainability consulting and CSRD reporting.",
        "{name} expands its financial due diligence services in the mid-market.",
    ],
    topics: &["Audit", "ESG", "Due diligence", "M&A", "Regulation", "Expansion"],
    leader_prompt: "List the 5 leading mid-market financial consultancies, including boutiques specialized in audit, ESG and due diligence. Names only, separated by commas.",
};

static PAYROLL: DomainProfile = DomainProfile {
    label: "Payroll software and outsourcing",
    sector: "payroll software outsourcing time tracking personnel administration",
    search_templates: [
        "{name} payroll software outsourcing",
        "{name} employee portal app time tracking clock-in",
        "{name} flexible compensation benefits plan",
        "{name} personnel administration hiring contracts",
        "{name} shift planning payroll automation RPA",
    ],
    news_templates: [
        "{name} payroll software new feature launch",
        "{name} time tracking employee app portal",
        "{name} flexible compensation benefits payroll automation",
    ],
    simulated_templates: [
        "{name} releases a new version of its payroll platform with built-in AI.",
        "{name} adds a flexible compensation and employee wellbeing module.",
        "{name} strengthens its HR Tech market presence with new integrations.",
    ],
    topics: &["Payroll", "Time tracking", "Employee portal", "Benefits", "Automation", "Pricing"],
    leader_prompt: "List the 5 leading payroll software and payroll outsourcing companies, covering both HR Tech SaaS and traditional outsourcing firms. Names only, separated by commas.",
};

static BPO: DomainProfile = DomainProfile {
    label: "Accounting and tax outsourcing",
    sector: "accounting tax BPO financial process outsourcing",
    search_templates: [
        "{name} accounting tax outsourcing BPO",
        "{name} invoice digitization accounting automation",
        "{name} e-invoicing tax compliance services",
        "{name} finance staff loan outsourcing",
        "{name} financial process outsourcing clients case studies",
    ],
    news_templates: [
        "{name} accounting tax BPO new service",
        "{name} invoice digitization RPA accounting automation",
        "{name} e-invoicing tax regulation change",
    ],
    simulated_templates: [
        "{name} launches an accounting process automation offering.",
        "{name} adapts its services to new e-invoicing regulation.",
        "{name} grows its finance outsourcing client base.",
    ],
    topics: &["Accounting", "Tax", "E-invoicing", "Automation", "Regulation", "Staffing"],
    leader_prompt: "List the 5 leading accounting and tax outsourcing (BPO) providers. Names only, separated by commas.",
};

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("hr", Domain::Hr)]
    #[test_case("Financial", Domain::Financial)]
    #[test_case(" payroll ", Domain::Payroll)]
    #[test_case("BPO", Domain::Bpo)]
    fn test_parse_domain(input: &str, expected: Domain) {
        assert_eq!(input.parse::<Domain>().ok(), Some(expected));
    }

    #[test]
    fn test_parse_unknown_domain() {
        assert!(matches!(
            "retail".parse::<Domain>(),
            Err(CommandError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_templates_render_name() {
        for domain in Domain::ALL {
            let profile = domain.profile();
            for query in profile
                .search_queries("Acme")
                .iter()
                .chain(&profile.news_queries("Acme"))
                .chain(&profile.simulated_snippets("Acme"))
            {
                assert!(query.contains("Acme"), "{domain}: {query}");
                assert!(!query.contains("{name}"));
            }
            assert!(!profile.topics.is_empty());
        }
    }

    #[test]
    fn test_display_round_trips_parse() {
        for domain in Domain::ALL {
            assert_eq!(domain.to_string().parse::<Domain>().ok(), Some(domain));
        }
    }
}
