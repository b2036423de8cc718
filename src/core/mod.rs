//! Core data model.
//!
//! Plain types shared by the research pipeline, the competitor analysis
//! and the CLI. Nothing here performs I/O.

pub mod feedback;
pub mod finding;
pub mod grade;
pub mod plan;
pub mod search;

pub use feedback::{Feedback, SearchQuery};
pub use finding::Finding;
pub use grade::Grade;
pub use plan::{Dimension, PhaseKind, PlanPhase, ResearchPlan, ResearchTarget};
pub use search::{SearchHit, truncate_graphemes};
