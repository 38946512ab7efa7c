//! Grouping of tagged tokens into report fields.
//!
//! Miscellaneous-entity tokens become crime types when they appear in the
//! crime vocabulary; organization tokens are collected as stolen items.
//! Token order from the tagger is preserved and nothing is deduplicated.

use std::collections::BTreeSet;

use report_ner_ner::{EntityClass, TaggedToken};
use report_ner_report_models::{CRIME_TYPE, ExtractionResult, ITEMS_STOLEN};

/// Case-insensitive allow-list of crime-type words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrimeVocabulary {
    words: BTreeSet<String>,
}

impl CrimeVocabulary {
    /// Builds a vocabulary from `words`, lowercasing each one.
    #[must_use]
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        Self {
            words: words
                .iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Whether `word` (in any case) is in the vocabulary.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Entity tokens grouped by the report field they feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityGroups {
    /// Crime-type words, verbatim, in tagger order.
    pub crime_types: Vec<String>,
    /// Organization tokens, verbatim, in tagger order.
    pub items_stolen: Vec<String>,
}

impl EntityGroups {
    /// Whether neither group has any token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crime_types.is_empty() && self.items_stolen.is_empty()
    }

    /// Writes `crime_type` (space-joined) and `items_stolen` into `result`,
    /// each only if non-empty.
    pub fn apply(self, result: &mut ExtractionResult) {
        if !self.crime_types.is_empty() {
            result.insert(CRIME_TYPE, self.crime_types.join(" "));
        }
        if !self.items_stolen.is_empty() {
            result.insert(ITEMS_STOLEN, self.items_stolen);
        }
    }
}

/// Groups `tokens` into crime types and stolen items.
#[must_use]
pub fn group_entities(tokens: &[TaggedToken], vocabulary: &CrimeVocabulary) -> EntityGroups {
    let mut groups = EntityGroups::default();

    for token in tokens {
        match token.entity() {
            Some(EntityClass::Misc) if vocabulary.contains(&token.word) => {
                groups.crime_types.push(token.word.clone());
            }
            Some(EntityClass::Org) => groups.items_stolen.push(token.word.clone()),
            _ => {}
        }
    }

    log::debug!(
        "Grouped {} crime type(s) and {} item(s) from {} token(s)",
        groups.crime_types.len(),
        groups.items_stolen.len(),
        tokens.len()
    );

    groups
}
