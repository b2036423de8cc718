//! The cumulative research document.
//!
//! A [`Finding`] only grows. There is no API to remove, truncate or
//! rewrite text, so every later version contains every earlier one as a
//! prefix.

use serde::{Deserialize, Serialize};

/// Accumulated free-text research output for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    text: String,
    sections: usize,
}

impl Finding {
    /// Starts a finding with a title line.
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            text: format!("# {title}\n"),
            sections: 0,
        }
    }

    /// Appends a `## heading` section. Blank bodies are ignored.
    ///
    /// Returns `true` if text was added.
    pub fn append_section(&mut self, heading: &str, body: &str) -> bool {
        let body = body.trim();
        if body.is_empty() {
            return false;
        }
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str("\n## ");
        self.text.push_str(heading.trim());
        self.text.push_str("\n\n");
        self.text.push_str(body);
        self.text.push('\n');
        self.sections += 1;
        true
    }

    /// Returns the full document.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of sections appended so far.
    #[must_use]
    pub const fn sections(&self) -> usize {
        self.sections
    }

    /// Byte length of the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` when no sections have been added.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sections == 0
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_append_section_format() {
        let mut finding = Finding::titled("Research findings: Acme");
        assert!(finding.is_empty());
        assert!(finding.append_section("Strategy", "Acquired Foo."));
        assert_eq!(
            finding.as_str(),
            "# Research findings: Acme\n\n## Strategy\n\nAcquired Foo.\n"
        );
        assert_eq!(finding.sections(), 1);
    }

    #[test]
    fn test_blank_body_is_ignored() {
        let mut finding = Finding::titled("T");
        let before = finding.clone();
        assert!(!finding.append_section("Empty", "  \n "));
        assert_eq!(finding, before);
    }

    proptest! {
        #[test]
        fn prop_append_preserves_prefix(sections in proptest::collection::vec(("[a-z ]{0,12}", "\\PC{0,40}"), 0..8)) {
            let mut finding = Finding::titled("Acme");
            for (heading, body) in &sections {
                let before = finding.as_str().to_string();
                finding.append_section(heading, body);
                prop_assert!(finding.as_str().starts_with(&before));
            }
        }
    }
}
