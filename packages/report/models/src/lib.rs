#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for police report extraction.
//!
//! Defines the [`ExtractionResult`] produced for each report, the
//! [`FieldValue`] variants it can hold, and the [`ExtractorConfig`] (field
//! patterns plus crime vocabulary) that is injected into the extractor and
//! persisted alongside a saved model.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field name for the report number.
pub const REPORT_NUMBER: &str = "report_number";
/// Field name for the incident date and time.
pub const DATE_TIME: &str = "date_time";
/// Field name for the reporting officer.
pub const REPORTING_OFFICER: &str = "reporting_officer";
/// Field name for the incident location.
pub const INCIDENT_LOCATION: &str = "incident_location";
/// Field name for the coordinates, normalized into [`Coordinates`] when
/// parseable.
pub const COORDINATES: &str = "coordinates";
/// Field name for the free-text description fed to the NER model.
pub const DETAILED_DESCRIPTION: &str = "detailed_description";
/// Field name for the police district.
pub const POLICE_DISTRICT: &str = "police_district";
/// Field name for the resolution.
pub const RESOLUTION: &str = "resolution";
/// Field name for the suspect description.
pub const SUSPECT_DESCRIPTION: &str = "suspect_description";
/// Field name for the victim information.
pub const VICTIM_INFORMATION: &str = "victim_information";
/// Field name for crime-type tokens recognized in the description.
pub const CRIME_TYPE: &str = "crime_type";
/// Field name for organization tokens recognized in the description.
pub const ITEMS_STOLEN: &str = "items_stolen";

/// Lowercase words accepted as crime types when tagged as miscellaneous
/// entities.
pub const DEFAULT_CRIME_VOCABULARY: &[&str] = &["theft", "stolen", "robbery", "burglary", "assault"];

/// A latitude/longitude pair parsed from a report's coordinates line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// The value stored under one key of an [`ExtractionResult`].
///
/// Serialized untagged so the JSON output is a plain string, an object
/// with `latitude`/`longitude`, or an array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A trimmed regex capture or a joined list of crime-type tokens.
    Text(String),
    /// Structured coordinates (only used for [`COORDINATES`]).
    Coordinates(Coordinates),
    /// A list of strings (only used for [`ITEMS_STOLEN`]).
    List(Vec<String>),
}

impl FieldValue {
    /// Returns the text if this is a [`FieldValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the coordinates if this is a [`FieldValue::Coordinates`].
    #[must_use]
    pub const fn as_coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Coordinates(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the list if this is a [`FieldValue::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Coordinates> for FieldValue {
    fn from(value: Coordinates) -> Self {
        Self::Coordinates(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Fields extracted from a single report, in insertion order.
///
/// Keys are only ever added or overwritten. Overwriting a key keeps its
/// original position, so a normalized `coordinates` value stays where the
/// raw capture was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: IndexMap<String, FieldValue>,
}

impl ExtractionResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Returns the value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the value for `name` if it is present and textual.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A named regular expression whose first capture group yields a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPattern {
    /// Output key (e.g. `"report_number"`).
    pub name: String,
    /// Regex with at least one capture group.
    pub pattern: String,
}

impl FieldPattern {
    /// Creates a new field pattern.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// Immutable configuration for a report extractor.
///
/// The pattern order defines both the extraction order and the key order
/// of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Lowercase allow-list for miscellaneous-entity crime types.
    #[serde(default = "default_crime_vocabulary")]
    pub crime_vocabulary: Vec<String>,
    /// Ordered field patterns. Names must be unique.
    pub patterns: Vec<FieldPattern>,
}

impl ExtractorConfig {
    /// Returns the first field name that appears more than once.
    #[must_use]
    pub fn duplicate_field(&self) -> Option<&str> {
        let mut seen = BTreeSet::new();
        self.patterns
            .iter()
            .map(|p| p.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            crime_vocabulary: default_crime_vocabulary(),
            patterns: default_patterns(),
        }
    }
}

/// The standard field patterns for police incident reports.
///
/// Free-text sections run until the next known heading or the end of the
/// text. The terminator is matched but not captured.
#[must_use]
pub fn default_patterns() -> Vec<FieldPattern> {
    vec![
        FieldPattern::new(REPORT_NUMBER, r"Report Number:\s*([^\n]+)"),
        FieldPattern::new(DATE_TIME, r"Date & Time:\s*([^\n]+)"),
        FieldPattern::new(REPORTING_OFFICER, r"Reporting Officer:\s*([^\n]+)"),
        FieldPattern::new(INCIDENT_LOCATION, r"Incident Location:\s*([^\n]+)"),
        FieldPattern::new(COORDINATES, r"Coordinates:\s*([^\n]+)"),
        FieldPattern::new(
            DETAILED_DESCRIPTION,
            r"Detailed Description:(.*?)(?:Police District:|$)",
        ),
        FieldPattern::new(POLICE_DISTRICT, r"Police District:\s*([^\n]+)"),
        FieldPattern::new(RESOLUTION, r"Resolution:\s*([^\n]+)"),
        FieldPattern::new(
            SUSPECT_DESCRIPTION,
            r"Suspect Description:(.*?)(?:Victim Information:|$)",
        ),
        FieldPattern::new(VICTIM_INFORMATION, r"Victim Information:(.*)$"),
    ]
}

/// The standard crime-type allow-list as owned strings.
#[must_use]
pub fn default_crime_vocabulary() -> Vec<String> {
    DEFAULT_CRIME_VOCABULARY
        .iter()
        .map(|&word| word.to_owned())
        .collect()
}
