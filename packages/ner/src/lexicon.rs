//! Lexicon-driven tagger.
//!
//! [`StaticTagger`] labels every whole-word, case-insensitive occurrence of
//! a known phrase.  It stands in for a pretrained model when no model files
//! are available and gives tests a deterministic collaborator.

use crate::{NerError, TaggedToken, TokenTagger};

/// A tagger backed by a fixed phrase → label lexicon.
#[derive(Debug, Clone, Default)]
pub struct StaticTagger {
    /// `(lowercased phrase, label)` pairs in registration order.
    entries: Vec<(String, String)>,
}

impl StaticTagger {
    /// Creates an empty tagger that recognizes nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a phrase to recognize with the given label (e.g. `"B-ORG"`).
    ///
    /// Empty phrases are ignored.
    #[must_use]
    pub fn with_entry(mut self, phrase: &str, label: &str) -> Self {
        let phrase = phrase.trim();
        if !phrase.is_empty() {
            self.entries
                .push((phrase.to_ascii_lowercase(), label.to_owned()));
        }
        self
    }

    /// Adds every phrase in `phrases` with the same label.
    #[must_use]
    pub fn with_entries<S: AsRef<str>>(self, phrases: &[S], label: &str) -> Self {
        phrases
            .iter()
            .fold(self, |tagger, phrase| tagger.with_entry(phrase.as_ref(), label))
    }

    /// Number of registered phrases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no phrases are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TokenTagger for StaticTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, NerError> {
        // ASCII lowercasing keeps byte offsets aligned with `text`.
        let haystack = text.to_ascii_lowercase();

        let mut spans: Vec<(usize, usize, &str)> = Vec::new();
        for (phrase, label) in &self.entries {
            for (start, _) in haystack.match_indices(phrase.as_str()) {
                let end = start + phrase.len();
                if is_word_boundary(text, start, end) {
                    spans.push((start, end, label.as_str()));
                }
            }
        }

        // Earliest first; on a tie the longer phrase wins.
        spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut tokens = Vec::with_capacity(spans.len());
        let mut covered = 0;
        for (start, end, label) in spans {
            if start < covered {
                continue;
            }
            covered = end;
            tokens.push(TaggedToken {
                word: text[start..end].to_owned(),
                label: label.to_owned(),
                score: 1.0,
                start: Some(start),
                end: Some(end),
            });
        }

        log::trace!("Lexicon tagged {} token(s)", tokens.len());

        Ok(tokens)
    }
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
