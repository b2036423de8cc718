//! Competitive market analysis.
//!
//! Each entity is analyzed independently (visibility probe, domain
//! searches, one batch sentiment/topic classification) and the entities
//! are fanned out over a bounded worker pool.

pub mod competitor;
pub mod discovery;
pub mod domain;
pub mod market;
pub mod news;
pub mod pool;
pub mod sentiment;

pub use competitor::{CompetitorAnalyzer, CompetitorRecord, EntityKind, MarketTarget};
pub use discovery::{detect_leaders, discover, discovery_query, parse_leaders};
pub use domain::{Domain, DomainProfile};
pub use market::{MarketAnalysis, MarketReport, MarketRequest, build_targets, rank, render_table};
pub use news::{NewsItem, NewsMonitor};
pub use pool::run_pool;
pub use sentiment::{Assessment, Sentiment, parse_assessment};
