//! Research evaluator.
//!
//! One critic call per loop iteration. Whatever the critic returns, the
//! result is a [`Feedback`]; anything that cannot be read as an explicit
//! pass is a fail.

use tracing::{debug, warn};

use super::classifier::TextClassifier;
use super::prompt::build_evaluator_prompt;
use super::search::strip_code_fences;
use super::stage::StageOutput;
use crate::core::{Feedback, Finding, ResearchTarget};
use crate::error::StageError;

const STAGE: &str = "evaluator";

/// Grades findings against the completeness rubric.
#[derive(Debug, Clone, Copy)]
pub struct ResearchEvaluator {
    max_follow_ups: usize,
}

impl ResearchEvaluator {
    /// Creates an evaluator keeping at most `max_follow_ups` queries.
    #[must_use]
    pub const fn new(max_follow_ups: usize) -> Self {
        Self { max_follow_ups }
    }

    /// Grades `finding`. Critic failures produce [`Feedback::fail_safe`].
    pub async fn evaluate(
        &self,
        target: &ResearchTarget,
        finding: &Finding,
        critic: &dyn TextClassifier,
    ) -> StageOutput<Feedback> {
        match self.try_evaluate(target, finding, critic).await {
            Ok(feedback) => {
                debug!(
                    grade = %feedback.grade,
                    follow_ups = feedback.follow_up_queries.len(),
                    "evaluation complete"
                );
                StageOutput::ok(feedback)
            }
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "evaluation unreadable; grading as fail");
                let feedback = Feedback::fail_safe(format!("evaluation unavailable: {e}"));
                StageOutput::degraded(feedback, vec![e])
            }
        }
    }

    /// Grades `finding`, surfacing critic failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Malformed`] when the critic output is not a
    /// feedback object, or a transport error from the critic.
    pub async fn try_evaluate(
        &self,
        target: &ResearchTarget,
        finding: &Finding,
        critic: &dyn TextClassifier,
    ) -> Result<Feedback, StageError> {
        let prompt = build_evaluator_prompt(target, finding);
        let content = critic
            .generate(&prompt)
            .await
            .map_err(|e| StageError::from_agent(STAGE, e))?;
        let mut feedback = parse_feedback(&content)?;
        feedback.follow_up_queries.retain(|q| !q.is_blank());
        feedback.follow_up_queries.truncate(self.max_follow_ups);
        Ok(feedback)
    }
}

/// Parses critic output into [`Feedback`].
///
/// Accepts bare JSON, fenced JSON, `<feedback>` tags, or an object buried
/// in surrounding prose.
///
/// # Errors
///
/// Returns [`StageError::Malformed`] when no feedback object can be found.
pub fn parse_feedback(content: &str) -> Result<Feedback, StageError> {
    let trimmed = content.trim();
    let json_str = trimmed
        .strip_prefix("<feedback>")
        .and_then(|s| s.strip_suffix("</feedback>"))
        .map_or_else(|| strip_code_fences(trimmed), str::trim);

    let direct_err = match serde_json::from_str::<Feedback>(json_str) {
        Ok(feedback) => return Ok(feedback),
        Err(e) => e,
    };

    if let (Some(start), Some(end)) = (json_str.find('{'), json_str.rfind('}'))
        && start < end
        && let Ok(feedback) = serde_json::from_str::<Feedback>(&json_str[start..=end])
    {
        return Ok(feedback);
    }

    let preview: String = json_str.chars().take(200).collect();
    Err(StageError::Malformed {
        stage: STAGE,
        message: format!(
            "failed to parse feedback JSON: {direct_err}. \
             Response length: {} bytes, preview: {preview:?}",
            json_str.len()
        ),
        content: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedClassifier;
    use crate::core::{Grade, SearchQuery};
    use crate::error::ErrorKind;
    use test_case::test_case;

    fn acme() -> ResearchTarget {
        ResearchTarget::new("Acme Corp").unwrap_or_else(|_| unreachable!())
    }

    #[test_case("not json at all"; "prose")]
    #[test_case(""; "empty")]
    #[test_case("```json\n{\"grade\": \n```"; "truncated")]
    #[test_case("[1, 2, 3]"; "wrong shape")]
    fn test_unparseable_is_malformed(content: &str) {
        let err = parse_feedback(content);
        assert!(matches!(err, Err(StageError::Malformed { .. })));
    }

    #[test]
    fn test_parse_null_comment_is_not_malformed() {
        let fb = parse_feedback(r#"{"grade":"fail","comment":null,"follow_up_queries":["Acme glassdoor"]}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(fb.follow_up_queries, vec![SearchQuery::new("Acme glassdoor")]);
    }

    #[test]
    fn test_parse_in_prose_and_tags() {
        let fb = parse_feedback("Sure! {\"grade\":\"pass\",\"comment\":\"complete\"} Hope that helps.")
            .unwrap_or_default();
        assert_eq!(fb.grade, Grade::Pass);
        let fb = parse_feedback("<feedback>{\"grade\":\"fail\"}</feedback>").unwrap_or_default();
        assert_eq!(fb.grade, Grade::Fail);
    }

    #[test]
    fn test_unknown_grade_is_fail() {
        let fb = parse_feedback(r#"{"grade":"excellent","comment":"wow"}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(fb.grade, Grade::Fail);
    }

    #[tokio::test]
    async fn test_malformed_output_defaults_to_fail() {
        let critic = ScriptedClassifier::always("PASS PASS PASS");
        let out = ResearchEvaluator::new(5)
            .evaluate(&acme(), &Finding::titled("x"), &critic)
            .await;
        assert_eq!(out.value.grade, Grade::Fail);
        assert!(out.value.follow_up_queries.is_empty());
        assert_eq!(out.errors[0].kind(), ErrorKind::Malformed);
    }

    #[tokio::test]
    async fn test_transport_failure_defaults_to_fail() {
        let critic = ScriptedClassifier::failing();
        let out = ResearchEvaluator::new(5)
            .evaluate(&acme(), &Finding::titled("x"), &critic)
            .await;
        assert_eq!(out.value.grade, Grade::Fail);
        assert_eq!(out.errors[0].kind(), ErrorKind::Transient);
    }

    #[tokio::test]
    async fn test_follow_ups_sanitized() {
        let critic = ScriptedClassifier::always(
            r#"{"grade":"fail","comment":"no reputation","follow_up_queries":["a","  ",{"search_query":"b"},"c","d"]}"#,
        );
        let out = ResearchEvaluator::new(3)
            .evaluate(&acme(), &Finding::titled("x"), &critic)
            .await;
        assert!(out.is_clean());
        assert_eq!(
            out.value.follow_up_queries,
            vec![SearchQuery::new("a"), SearchQuery::new("b"), SearchQuery::new("c")]
        );
        assert!(critic.prompts()[0].contains("<company>Acme Corp</company>"));
    }
}
