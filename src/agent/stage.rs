//! Shared plumbing for pipeline stages.

use super::classifier::TextClassifier;
use super::search::SearchProvider;
use crate::error::StageError;

/// Output of a stage that degrades instead of failing.
///
/// `value` is always usable. `errors` lists what went wrong on the way so
/// the caller can log it, surface it or decide to stop.
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    /// The stage result, possibly degraded.
    pub value: T,
    /// Failures recovered from while producing `value`.
    pub errors: Vec<StageError>,
    /// Search calls issued by the stage.
    pub searches: usize,
}

impl<T> StageOutput<T> {
    /// A clean result.
    pub const fn ok(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
            searches: 0,
        }
    }

    /// A result produced despite `errors`.
    pub const fn degraded(value: T, errors: Vec<StageError>) -> Self {
        Self {
            value,
            errors,
            searches: 0,
        }
    }

    /// Records how many searches the stage issued.
    #[must_use]
    pub const fn with_searches(mut self, searches: usize) -> Self {
        self.searches = searches;
        self
    }

    /// Returns `true` when no failure was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// External capabilities borrowed by a stage for one call.
#[derive(Clone, Copy)]
pub struct ResearchTools<'a> {
    /// Web search.
    pub search: &'a dyn SearchProvider,
    /// Worker model for planning and summaries.
    pub worker: &'a dyn TextClassifier,
}

impl std::fmt::Debug for ResearchTools<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchTools").finish_non_exhaustive()
    }
}
