//! Evaluator verdict on a finding.
//!
//! Parsing is closed-world: only an explicit `pass` is a pass. Anything
//! else, including garbage, empty strings and unknown labels, is a fail so
//! that noise from the model can never end refinement early.

use serde::{Deserialize, Deserializer, Serialize};

/// Two-valued grade for a research finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// The finding covers every investigation dimension in depth.
    Pass,
    /// Something is missing or superficial.
    #[default]
    Fail,
}

impl Grade {
    /// Parses a grade string (case-insensitive, surrounding quotes and
    /// whitespace ignored). Unknown input is [`Grade::Fail`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let cleaned = s.trim().trim_matches(|c| c == '"' || c == '\'' || c == '.');
        if cleaned.eq_ignore_ascii_case("pass") {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    /// Returns `true` for [`Grade::Pass`].
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map_or(Self::Fail, Self::parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("pass", Grade::Pass; "lowercase")]
    #[test_case("PASS", Grade::Pass; "uppercase")]
    #[test_case(" \"Pass\" ", Grade::Pass; "quoted")]
    #[test_case("fail", Grade::Fail; "fail")]
    #[test_case("", Grade::Fail; "empty")]
    #[test_case("passed", Grade::Fail; "near miss")]
    #[test_case("pass|fail", Grade::Fail; "schema echo")]
    fn test_grade_parse(input: &str, expected: Grade) {
        assert_eq!(Grade::parse(input), expected);
    }

    #[test]
    fn test_grade_deserialize_non_string_is_fail() {
        let grade: Grade = serde_json::from_str("true").unwrap_or(Grade::Pass);
        assert_eq!(grade, Grade::Fail);
        let grade: Grade = serde_json::from_str("null").unwrap_or(Grade::Pass);
        assert_eq!(grade, Grade::Fail);
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(format!("{}", Grade::Pass), "pass");
        assert_eq!(Grade::default().to_string(), "fail");
    }

    proptest! {
        #[test]
        fn prop_only_pass_parses_as_pass(s in "\\PC*") {
            let cleaned = s.trim().trim_matches(|c| c == '"' || c == '\'' || c == '.');
            prop_assume!(!cleaned.eq_ignore_ascii_case("pass"));
            prop_assert_eq!(Grade::parse(&s), Grade::Fail);
        }
    }
}
