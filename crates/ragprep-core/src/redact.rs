use std::borrow::Cow;

use regex::Regex;

use crate::config::{RedactionConfig, Substitution};

/// Literal-pattern masking of sensitive text.
///
/// Text containing any trigger token (case-insensitive) gets every configured
/// literal replaced by its mask and is prefixed with the audit marker. This is
/// best-effort: only the configured literals are masked, anything else in a
/// triggered text passes through untouched.
#[derive(Debug, Clone)]
pub struct RedactionFilter {
    triggers: Option<Regex>,
    substitutions: Vec<Substitution>,
    marker: String,
}

impl RedactionFilter {
    /// Build a filter from config. A disabled config or an empty trigger list
    /// yields a pass-through filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the combined trigger pattern exceeds regex size limits.
    pub fn new(config: &RedactionConfig) -> Result<Self, regex::Error> {
        let triggers = if config.enabled && !config.triggers.is_empty() {
            let alternation = config
                .triggers
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("(?i)(?:{alternation})"))?)
        } else {
            None
        };

        Ok(Self {
            triggers,
            substitutions: config.substitutions.clone(),
            marker: config.marker.clone(),
        })
    }

    /// A filter that never modifies text.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            triggers: None,
            substitutions: Vec::new(),
            marker: String::new(),
        }
    }

    #[must_use]
    pub fn is_triggered(&self, text: &str) -> bool {
        self.triggers.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Mask configured literals and stamp the audit marker.
    ///
    /// Returns `Cow::Borrowed` exactly when no trigger matched, so callers can
    /// count redactions with `matches!(result, Cow::Owned(_))`.
    #[must_use]
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !self.is_triggered(text) {
            return Cow::Borrowed(text);
        }

        let mut masked = text.to_owned();
        let mut replaced = 0usize;
        for sub in &self.substitutions {
            let hits = masked.matches(sub.literal.as_str()).count();
            if hits > 0 {
                masked = masked.replace(sub.literal.as_str(), &sub.mask);
                replaced += hits;
            }
        }
        tracing::debug!(replaced, "redaction applied");

        Cow::Owned(format!("{} {masked}", self.marker))
    }
}

impl Default for RedactionFilter {
    fn default() -> Self {
        Self::new(&RedactionConfig::default()).expect("default redaction triggers are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_known_name_when_triggered() {
        let filter = RedactionFilter::default();
        let result = filter.redact("Patient John Smith was admitted.");
        assert_eq!(
            result,
            "[HIPAA REDACTION APPLIED] Patient [PHI_NAME_MASKED] was admitted."
        );
    }

    #[test]
    fn trigger_is_case_insensitive() {
        let filter = RedactionFilter::default();
        assert!(filter.is_triggered("PATIENT record"));
        assert!(filter.is_triggered("the Ssn field"));
        assert!(filter.is_triggered("outpatient visit"));
    }

    #[test]
    fn marker_added_without_substitution_hit() {
        let filter = RedactionFilter::default();
        let result = filter.redact("SSN on file: 000-00-0000");
        assert_eq!(result, "[HIPAA REDACTION APPLIED] SSN on file: 000-00-0000");
    }

    #[test]
    fn untriggered_text_is_borrowed() {
        let filter = RedactionFilter::default();
        let text = "John Smith bought a bicycle.";
        let result = filter.redact(text);
        assert_eq!(result, text);
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn literal_match_is_case_sensitive() {
        let filter = RedactionFilter::default();
        let result = filter.redact("patient JOHN SMITH");
        assert_eq!(result, "[HIPAA REDACTION APPLIED] patient JOHN SMITH");
    }

    #[test]
    fn every_occurrence_is_masked() {
        let filter = RedactionFilter::default();
        let result = filter.redact("patient John Smith, contact John Smith");
        assert!(!result.contains("John Smith"));
        assert_eq!(result.matches("[PHI_NAME_MASKED]").count(), 2);
    }

    #[test]
    fn disabled_config_passes_through() {
        let config = RedactionConfig {
            enabled: false,
            ..RedactionConfig::default()
        };
        let filter = RedactionFilter::new(&config).unwrap();
        let result = filter.redact("patient John Smith");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert!(matches!(
            RedactionFilter::disabled().redact("ssn"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn custom_triggers_and_substitutions() {
        let config = RedactionConfig {
            enabled: true,
            triggers: vec!["member".into(), "a.b".into()],
            marker: "[REDACTED]".into(),
            substitutions: vec![
                Substitution {
                    literal: "Jane Doe".into(),
                    mask: "[NAME]".into(),
                },
                Substitution {
                    literal: "555-0100".into(),
                    mask: "[PHONE]".into(),
                },
            ],
        };
        let filter = RedactionFilter::new(&config).unwrap();
        assert_eq!(
            filter.redact("Member Jane Doe, 555-0100"),
            "[REDACTED] Member [NAME], [PHONE]"
        );
        // trigger tokens are literal, not regex
        assert!(!filter.is_triggered("aXb"));
        assert!(filter.is_triggered("A.B"));
    }

    #[test]
    fn empty_string() {
        assert_eq!(RedactionFilter::default().redact(""), "");
    }

    mod proptest_redact {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn untriggered_text_unchanged(text in "[a-oq-rt-z ]{0,200}") {
                // alphabet excludes 'p' and 's', so neither trigger can occur
                let filter = RedactionFilter::default();
                prop_assert_eq!(filter.redact(&text), text.as_str());
            }

            #[test]
            fn triggered_text_carries_marker(prefix in "\\PC{0,50}", suffix in "\\PC{0,50}") {
                let filter = RedactionFilter::default();
                let text = format!("{prefix}patient{suffix}");
                let result = filter.redact(&text);
                prop_assert!(result.starts_with("[HIPAA REDACTION APPLIED] "));
                prop_assert!(!result.contains("John Smith"));
            }
        }
    }
}
