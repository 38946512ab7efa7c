//! Model artifact files.
//!
//! A token-classification model is made of three files split across two
//! directories: the ONNX graph and its `config.json` (which carries the
//! `id2label` table) in the model directory, and `tokenizer.json` in the
//! tokenizer directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::NerError;

/// ONNX graph file name inside the model directory.
pub const MODEL_FILE: &str = "model.onnx";
/// Model configuration file name inside the model directory.
pub const CONFIG_FILE: &str = "config.json";
/// Tokenizer file name inside the tokenizer directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Locations of the files that make up a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    /// Path to `model.onnx`.
    pub model: PathBuf,
    /// Path to `config.json`.
    pub config: PathBuf,
    /// Path to `tokenizer.json`.
    pub tokenizer: PathBuf,
}

impl ModelArtifacts {
    /// Artifact paths for the given model and tokenizer directories.
    #[must_use]
    pub fn in_dirs(model_dir: &Path, tokenizer_dir: &Path) -> Self {
        Self {
            model: model_dir.join(MODEL_FILE),
            config: model_dir.join(CONFIG_FILE),
            tokenizer: tokenizer_dir.join(TOKENIZER_FILE),
        }
    }

    /// Checks that every artifact exists.
    ///
    /// # Errors
    ///
    /// Returns [`NerError::MissingArtifact`] naming the first missing file.
    pub fn verify(&self) -> Result<(), NerError> {
        for path in [&self.model, &self.config, &self.tokenizer] {
            if !path.is_file() {
                return Err(NerError::MissingArtifact(path.clone()));
            }
        }
        Ok(())
    }

    /// Copies every artifact into `model_dir` and `tokenizer_dir`, creating
    /// them if necessary, and returns the new locations.
    ///
    /// Copying onto the same paths is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`NerError`] if an artifact is missing or a copy fails.
    pub fn save_to(&self, model_dir: &Path, tokenizer_dir: &Path) -> Result<Self, NerError> {
        self.verify()?;

        let target = Self::in_dirs(model_dir, tokenizer_dir);
        std::fs::create_dir_all(model_dir)?;
        std::fs::create_dir_all(tokenizer_dir)?;

        for (from, to) in [
            (&self.model, &target.model),
            (&self.config, &target.config),
            (&self.tokenizer, &target.tokenizer),
        ] {
            if same_file(from, to) {
                continue;
            }
            let bytes = std::fs::copy(from, to)?;
            log::debug!("Copied {} ({bytes} bytes) to {}", from.display(), to.display());
        }

        Ok(target)
    }

    /// Reads the label table from `config.json`, indexed by class id.
    ///
    /// # Errors
    ///
    /// Returns [`NerError`] if the file cannot be read or parsed, or if
    /// the class ids are not contiguous from zero.
    pub fn read_labels(&self) -> Result<Vec<String>, NerError> {
        let raw = std::fs::read_to_string(&self.config)?;
        parse_labels(&raw)
    }
}

#[derive(Deserialize)]
struct ModelConfig {
    id2label: BTreeMap<String, String>,
}

/// Parses the `id2label` table of a model `config.json`.
///
/// # Errors
///
/// Returns [`NerError`] if the JSON is invalid or the ids are not
/// contiguous integers starting at zero.
pub fn parse_labels(raw: &str) -> Result<Vec<String>, NerError> {
    let config: ModelConfig = serde_json::from_str(raw)?;

    let mut indexed = BTreeMap::new();
    for (id, label) in config.id2label {
        let id: usize = id
            .parse()
            .map_err(|_| NerError::InvalidOutput(format!("non-numeric label id '{id}'")))?;
        indexed.insert(id, label);
    }

    if indexed.keys().copied().ne(0..indexed.len()) {
        return Err(NerError::InvalidOutput(
            "label ids are not contiguous from 0".to_owned(),
        ));
    }

    Ok(indexed.into_values().collect())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "architectures": ["BertForTokenClassification"],
        "id2label": {"0": "O", "1": "B-MISC", "2": "I-MISC", "3": "B-PER", "10": "X", "4": "I-PER", "5": "B-ORG", "6": "I-ORG", "7": "B-LOC", "8": "I-LOC", "9": "Y"}
    }"#;

    fn write_artifacts(model_dir: &Path, tokenizer_dir: &Path) -> ModelArtifacts {
        std::fs::create_dir_all(model_dir).unwrap();
        std::fs::create_dir_all(tokenizer_dir).unwrap();
        let artifacts = ModelArtifacts::in_dirs(model_dir, tokenizer_dir);
        std::fs::write(&artifacts.model, b"onnx-bytes").unwrap();
        std::fs::write(&artifacts.config, CONFIG).unwrap();
        std::fs::write(&artifacts.tokenizer, b"{}").unwrap();
        artifacts
    }

    #[test]
    fn parses_labels_in_id_order() {
        let labels = parse_labels(CONFIG).unwrap();
        assert_eq!(labels.len(), 11);
        assert_eq!(labels[0], "O");
        assert_eq!(labels[1], "B-MISC");
        assert_eq!(labels[5], "B-ORG");
        assert_eq!(labels[10], "X");
    }

    #[test]
    fn rejects_gaps_in_label_ids() {
        let err = parse_labels(r#"{"id2label": {"0": "O", "2": "B-ORG"}}"#).unwrap_err();
        assert!(matches!(err, NerError::InvalidOutput(_)));
    }

    #[test]
    fn verify_names_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ModelArtifacts::in_dirs(&dir.path().join("model"), &dir.path().join("tok"));
        match artifacts.verify() {
            Err(NerError::MissingArtifact(path)) => assert_eq!(path, artifacts.model),
            other => panic!("expected missing artifact, got {other:?}"),
        }
    }

    #[test]
    fn saves_artifacts_into_new_directories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let artifacts = write_artifacts(&src.path().join("m"), &src.path().join("t"));

        let saved = artifacts
            .save_to(&dst.path().join("model"), &dst.path().join("tokenizer"))
            .unwrap();

        saved.verify().unwrap();
        assert_eq!(std::fs::read(&saved.model).unwrap(), b"onnx-bytes");
        assert_eq!(saved.read_labels().unwrap()[5], "B-ORG");
    }

    #[test]
    fn saving_in_place_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("model");
        let tokenizer_dir = dir.path().join("tokenizer");
        let artifacts = write_artifacts(&model_dir, &tokenizer_dir);

        let saved = artifacts.save_to(&model_dir, &tokenizer_dir).unwrap();
        assert_eq!(saved, artifacts);
        assert_eq!(std::fs::read(&saved.model).unwrap(), b"onnx-bytes");
    }
}
