//! Market discovery and leader detection.

use tracing::{debug, warn};

use super::domain::Domain;
use crate::agent::classifier::TextClassifier;
use crate::agent::search::SearchProvider;
use crate::core::SearchHit;
use crate::error::StageError;

const STAGE: &str = "leader_detection";
/// Results requested by a discovery search.
pub const DISCOVERY_RESULTS: usize = 10;
/// Names this long or longer are treated as prose, not company names.
const MAX_LEADER_NAME_LEN: usize = 40;

/// Builds the market discovery query.
#[must_use]
pub fn discovery_query(sector: &str, location: &str, year: &str) -> String {
    format!("leading companies and startups in {sector} in {location} {year} ranking comparison")
}

/// Searches for market players in `domain`.
pub async fn discover(search: &dyn SearchProvider, domain: Domain, location: &str, year: &str) -> Vec<SearchHit> {
    let query = discovery_query(domain.profile().sector, location, year);
    let hits = search.search(&query, DISCOVERY_RESULTS).await;
    debug!(domain = %domain, hits = hits.len(), "market discovery");
    hits
}

/// Asks the model for the market leaders in `domain`.
///
/// # Errors
///
/// Returns a [`StageError`] when the model call fails.
pub async fn detect_leaders(
    classifier: &dyn TextClassifier,
    domain: Domain,
    own: &str,
    known: &[String],
) -> Result<Vec<String>, StageError> {
    let reply = classifier
        .generate(domain.profile().leader_prompt)
        .await
        .map_err(|e| StageError::from_agent(STAGE, e))?;
    let leaders = parse_leaders(&reply, own, known);
    if leaders.is_empty() {
        warn!(domain = %domain, "leader detection produced no new names");
    }
    Ok(leaders)
}

/// Parses a comma-separated list of company names.
///
/// Names are trimmed of whitespace and trailing periods. Blank names,
/// names of [`MAX_LEADER_NAME_LEN`] bytes or more, `own`, entries of
/// `known` and repeats are dropped, all compared case-insensitively.
#[must_use]
pub fn parse_leaders(reply: &str, own: &str, known: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = known.iter().map(|k| k.to_lowercase()).collect();
    seen.push(own.to_lowercase());

    let mut leaders = Vec::new();
    for part in reply.split(',') {
        let name = part.trim().trim_matches('.').trim();
        if name.is_empty() || name.len() >= MAX_LEADER_NAME_LEN {
            continue;
        }
        let key = name.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        leaders.push(name.to_string());
    }
    leaders
}
