#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structured field and entity extraction for police incident reports.
//!
//! A [`ReportExtractor`] runs three steps over the text of one report:
//!
//! 1. [`fields`]: fixed regex patterns pull out headed fields (report
//!    number, date, location, description, ...).
//! 2. [`coordinates`]: a `(lat, lng)` coordinates field is turned into a
//!    structured pair when it parses.
//! 3. [`entities`]: the detailed description is tagged by a
//!    [`TokenTagger`] and the tokens are grouped into `crime_type` and
//!    `items_stolen`.
//!
//! The extractor holds no mutable state, so one instance can serve any
//! number of reports. PDFs are read through [`report_ner_pdf`]; failures
//! there produce an empty result rather than an error.

pub mod batch;
pub mod coordinates;
pub mod entities;
pub mod fields;
pub mod layout;
pub mod persist;
pub mod progress;

use std::path::Path;

use report_ner_ner::TokenTagger;
use report_ner_report_models::{COORDINATES, DETAILED_DESCRIPTION, ExtractionResult, ExtractorConfig};
use thiserror::Error;

use crate::entities::{CrimeVocabulary, group_entities};
use crate::fields::FieldExtractor;

/// Errors in an extractor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two patterns share a field name.
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// A pattern failed to compile.
    #[error("Invalid pattern for field {field}: {source}")]
    InvalidPattern {
        /// Field the pattern belongs to.
        field: String,
        /// Compilation error.
        source: regex::Error,
    },

    /// A pattern has no capture group to take the value from.
    #[error("Pattern for field {0} has no capture group")]
    MissingCaptureGroup(String),
}

/// Extracts structured fields and entities from report text.
#[derive(Debug)]
pub struct ReportExtractor<T> {
    config: ExtractorConfig,
    fields: FieldExtractor,
    vocabulary: CrimeVocabulary,
    tagger: T,
}

impl<T: TokenTagger> ReportExtractor<T> {
    /// Creates an extractor from a configuration and a tagger.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration's patterns are invalid.
    pub fn new(config: ExtractorConfig, tagger: T) -> Result<Self, ConfigError> {
        let fields = FieldExtractor::new(&config.patterns)?;
        let vocabulary = CrimeVocabulary::new(&config.crime_vocabulary);

        Ok(Self {
            config,
            fields,
            vocabulary,
            tagger,
        })
    }

    /// The configuration this extractor was built from.
    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The tagger used for the description.
    #[must_use]
    pub const fn tagger(&self) -> &T {
        &self.tagger
    }

    /// Extracts every field from `text`.
    ///
    /// Missing fields are absent from the result. If the tagger fails, the
    /// failure is logged and the entity fields are left out.
    #[must_use]
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new();

        self.fields.extract_into(text, &mut result);

        if result.contains(COORDINATES) {
            coordinates::normalize_coordinates(&mut result);
        }

        let description = result
            .get_text(DETAILED_DESCRIPTION)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);

        if let Some(description) = description {
            match self.tagger.tag(&description) {
                Ok(tokens) => group_entities(&tokens, &self.vocabulary).apply(&mut result),
                Err(e) => log::warn!("Entity tagging failed, skipping entity fields: {e}"),
            }
        }

        result
    }

    /// Extracts every field from the PDF at `path`.
    ///
    /// An unreadable PDF is logged and treated as empty text.
    #[must_use]
    pub fn extract_pdf(&self, path: &Path) -> ExtractionResult {
        let text = report_ner_pdf::collect_text(path);
        self.extract(&text)
    }
}
