//! Loop termination predicate.

use super::state::RunState;

/// Decision taken after each evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopSignal {
    /// Keep refining.
    #[default]
    Continue,
    /// Stop: the latest evaluation passed.
    Terminate,
}

/// Pure check over [`RunState`]: terminate iff the latest feedback passed.
///
/// With no feedback yet (before the first evaluation) the answer is always
/// [`LoopSignal::Continue`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EscalationChecker;

impl EscalationChecker {
    /// Evaluates the predicate.
    #[must_use]
    pub const fn check(self, state: &RunState) -> LoopSignal {
        match &state.feedback {
            Some(feedback) if feedback.grade.is_pass() => LoopSignal::Terminate,
            _ => LoopSignal::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feedback, Grade, ResearchTarget};

    fn state(feedback: Option<Feedback>) -> RunState {
        let mut s = RunState::new(ResearchTarget::new("Acme").unwrap_or_else(|_| unreachable!()));
        s.feedback = feedback;
        s
    }

    #[test]
    fn test_initial_state_continues() {
        assert_eq!(EscalationChecker.check(&state(None)), LoopSignal::Continue);
        assert_eq!(LoopSignal::default(), LoopSignal::Continue);
    }

    #[test]
    fn test_pass_terminates() {
        let fb = Feedback {
            grade: Grade::Pass,
            ..Feedback::default()
        };
        assert_eq!(EscalationChecker.check(&state(Some(fb))), LoopSignal::Terminate);
    }

    #[test]
    fn test_fail_continues() {
        let fb = Feedback::fail_safe("thin");
        let s = state(Some(fb));
        assert_eq!(EscalationChecker.check(&s), LoopSignal::Continue);
        // Pure: same input, same answer, no mutation.
        assert_eq!(EscalationChecker.check(&s), LoopSignal::Continue);
        assert_eq!(s.evaluations, 0);
    }
}
