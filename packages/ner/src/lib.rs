#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Named-entity recognition for police report descriptions.
//!
//! The extraction pipeline only depends on the [`TokenTagger`] trait: give
//! it text, get back a sequence of [`TaggedToken`]s in document order.
//! Two implementations are provided:
//!
//! * [`OnnxTagger`] (feature `onnx`) runs a pretrained BERT token
//!   classifier exported to ONNX through ONNX Runtime.
//! * [`StaticTagger`] tags phrases from a fixed lexicon and needs no model
//!   files, which makes it suitable for tests and offline runs.
//!
//! Model files live in a model directory (`model.onnx`, `config.json`) and
//! a tokenizer directory (`tokenizer.json`); see [`artifacts`] and [`hub`].

pub mod artifacts;
pub mod hub;
pub mod label;
pub mod lexicon;
#[cfg(feature = "onnx")]
mod onnx;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use label::EntityClass;
pub use lexicon::StaticTagger;
#[cfg(feature = "onnx")]
pub use onnx::OnnxTagger;

/// Default pretrained model identifier on the `HuggingFace` hub.
pub const DEFAULT_MODEL_ID: &str = "dslim/bert-base-NER";

/// Errors that can occur while loading or running a tagger.
#[derive(Debug, Error)]
pub enum NerError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Downloading a pretrained model failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A required model file is missing.
    #[error("Model artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Tokenization failed.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// The inference runtime failed to load or run the model.
    #[error("Inference error: {0}")]
    Inference(String),

    /// The model produced output the tagger cannot interpret.
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    /// The inference session lock was poisoned by a panicking thread.
    #[error("Inference session lock poisoned")]
    Lock,
}

/// One token recognized by a tagger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Text of the token as produced by the tagger (may be a word piece).
    pub word: String,
    /// IOB label, e.g. `"B-MISC"` or `"I-ORG"`.
    pub label: String,
    /// Confidence of the label in `0.0..=1.0`.
    pub score: f32,
    /// Byte offset of the token start in the tagged text, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    /// Byte offset of the token end in the tagged text, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl TaggedToken {
    /// Creates a token without offsets.
    #[must_use]
    pub fn new(word: impl Into<String>, label: impl Into<String>, score: f32) -> Self {
        Self {
            word: word.into(),
            label: label.into(),
            score,
            start: None,
            end: None,
        }
    }

    /// The entity class encoded in this token's label, if any.
    #[must_use]
    pub fn entity(&self) -> Option<EntityClass> {
        EntityClass::from_label(&self.label)
    }
}

/// A token-classification model.
pub trait TokenTagger {
    /// Tags `text`, returning recognized tokens in document order.
    ///
    /// Tokens labelled as outside any entity are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`NerError`] if tokenization or inference fails.
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, NerError>;
}

impl<T: TokenTagger + ?Sized> TokenTagger for &T {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, NerError> {
        (**self).tag(text)
    }
}

impl<T: TokenTagger + ?Sized> TokenTagger for Box<T> {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, NerError> {
        (**self).tag(text)
    }
}
