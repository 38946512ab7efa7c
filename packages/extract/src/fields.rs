//! Regex-based field extraction.
//!
//! Each configured [`FieldPattern`] is compiled once.  Extraction searches
//! the whole report for the first match of every pattern and stores the
//! trimmed first capture group under the pattern's name.  Patterns are
//! independent: a later pattern may re-consume text an earlier one already
//! captured.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use report_ner_report_models::{ExtractionResult, FieldPattern};

use crate::ConfigError;

/// A compiled, ordered set of field patterns.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    fields: Vec<(String, Regex)>,
}

impl FieldExtractor {
    /// Compiles `patterns` with dot-matches-newline enabled.
    ///
    /// `$` keeps its default meaning of end of text, so free-text sections
    /// terminated by `(?:Heading:|$)` run to the end of the report when the
    /// heading is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if two patterns share a name, a pattern does
    /// not compile, or a pattern has no capture group.
    pub fn new(patterns: &[FieldPattern]) -> Result<Self, ConfigError> {
        let mut seen = BTreeSet::new();
        let mut fields = Vec::with_capacity(patterns.len());

        for FieldPattern { name, pattern } in patterns {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateField(name.clone()));
            }

            let regex = RegexBuilder::new(pattern)
                .dot_matches_new_line(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    field: name.clone(),
                    source,
                })?;

            if regex.captures_len() < 2 {
                return Err(ConfigError::MissingCaptureGroup(name.clone()));
            }

            fields.push((name.clone(), regex));
        }

        Ok(Self { fields })
    }

    /// Field names in extraction order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Applies every pattern to `text`, writing matched fields into
    /// `result`. Unmatched fields are left absent.
    pub fn extract_into(&self, text: &str, result: &mut ExtractionResult) {
        for (name, regex) in &self.fields {
            if let Some(caps) = regex.captures(text)
                && let Some(value) = caps.get(1)
            {
                result.insert(name.as_str(), value.as_str().trim());
            } else {
                log::trace!("No match for field {name}");
            }
        }
    }

    /// Applies every pattern to `text` and returns the matched fields.
    #[must_use]
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();
        self.extract_into(text, &mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use report_ner_report_models::{
        DETAILED_DESCRIPTION, POLICE_DISTRICT, REPORT_NUMBER, SUSPECT_DESCRIPTION,
        VICTIM_INFORMATION, default_patterns,
    };

    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(&default_patterns()).unwrap()
    }

    #[test]
    fn extracts_trimmed_single_line_fields() {
        let result = extractor().extract("Report Number:   RN-42   \nPolice District: North\n");
        assert_eq!(result.get_text(REPORT_NUMBER), Some("RN-42"));
        assert_eq!(result.get_text(POLICE_DISTRICT), Some("North"));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn unmatched_fields_are_absent() {
        let result = extractor().extract("nothing recognizable here");
        assert!(result.is_empty());
    }

    #[test]
    fn description_spans_lines_until_district() {
        let text = "Detailed Description: Line one.\nLine two.\nPolice District: East\n";
        let result = extractor().extract(text);
        assert_eq!(
            result.get_text(DETAILED_DESCRIPTION),
            Some("Line one.\nLine two.")
        );
    }

    #[test]
    fn description_runs_to_end_without_district() {
        let text = "Detailed Description: Bike taken.\nResolution: Open\n";
        let result = extractor().extract(text);
        assert_eq!(
            result.get_text(DETAILED_DESCRIPTION),
            Some("Bike taken.\nResolution: Open")
        );
        assert_eq!(result.get_text("resolution"), Some("Open"));
    }

    #[test]
    fn suspect_and_victim_sections() {
        let text = "Suspect Description: Tall, red jacket.\nVictim Information: Jane Doe, 34.\n";
        let result = extractor().extract(text);
        assert_eq!(
            result.get_text(SUSPECT_DESCRIPTION),
            Some("Tall, red jacket.")
        );
        assert_eq!(result.get_text(VICTIM_INFORMATION), Some("Jane Doe, 34."));
    }

    #[test]
    fn keys_follow_pattern_order_not_text_order() {
        let text = "Police District: West\nReport Number: 7\n";
        let result = extractor().extract(text);
        let keys: Vec<&str> = result.keys().collect();
        assert_eq!(keys, vec![REPORT_NUMBER, POLICE_DISTRICT]);
    }

    #[test]
    fn first_match_wins() {
        let result = extractor().extract("Report Number: 1\nReport Number: 2\n");
        assert_eq!(result.get_text(REPORT_NUMBER), Some("1"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = FieldExtractor::new(&[
            FieldPattern::new("a", "A:(.*)"),
            FieldPattern::new("a", "B:(.*)"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField(name) if name == "a"));
    }

    #[test]
    fn rejects_invalid_regex() {
        let err = FieldExtractor::new(&[FieldPattern::new("a", "A:(")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_pattern_without_capture_group() {
        let err = FieldExtractor::new(&[FieldPattern::new("a", "A:.*")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCaptureGroup(name) if name == "a"));
    }
}
