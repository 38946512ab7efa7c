//! ONNX Runtime token classification for BERT-style NER models.
//!
//! Runs a pretrained token classifier (e.g. `dslim/bert-base-NER` exported
//! to ONNX) and reports one [`TaggedToken`] per word piece whose predicted
//! label is not `O`, matching an un-aggregated `ner` pipeline.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use crate::artifacts::ModelArtifacts;
use crate::{NerError, TaggedToken, TokenTagger};

/// Maximum sequence length accepted by BERT-base models.
const MAX_LENGTH: usize = 512;

/// Label emitted for tokens outside any entity.
const OUTSIDE_LABEL: &str = "O";

/// Token classifier backed by ONNX Runtime.
///
/// The session sits behind a mutex because running it needs exclusive
/// access, while [`TokenTagger::tag`] only borrows the tagger.
pub struct OnnxTagger {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    artifacts: ModelArtifacts,
}

impl std::fmt::Debug for OnnxTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxTagger")
            .field("labels", &self.labels)
            .field("artifacts", &self.artifacts)
            .finish_non_exhaustive()
    }
}

fn inference(e: impl std::fmt::Display) -> NerError {
    NerError::Inference(e.to_string())
}

impl OnnxTagger {
    /// Loads a model from a model directory containing `model.onnx` and
    /// `config.json`, and a tokenizer directory containing
    /// `tokenizer.json`.
    ///
    /// # Errors
    ///
    /// Returns [`NerError`] if an artifact is missing or cannot be loaded.
    pub fn load_from(model_dir: &Path, tokenizer_dir: &Path) -> Result<Self, NerError> {
        let artifacts = ModelArtifacts::in_dirs(model_dir, tokenizer_dir);
        artifacts.verify()?;

        let labels = artifacts.read_labels()?;

        let session = Session::builder()
            .map_err(inference)?
            .commit_from_file(&artifacts.model)
            .map_err(inference)?;

        let mut tokenizer = Tokenizer::from_file(&artifacts.tokenizer)
            .map_err(|e| NerError::Tokenizer(format!("load tokenizer: {e}")))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| NerError::Tokenizer(format!("set truncation: {e}")))?;

        log::info!(
            "Loaded token classifier {} ({} labels)",
            artifacts.model.display(),
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
            artifacts,
        })
    }

    /// Label table indexed by class id.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Where this model was loaded from.
    #[must_use]
    pub const fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Saves the model files into `model_dir` and `tokenizer_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`NerError`] if a copy fails.
    pub fn save(&self, model_dir: &Path, tokenizer_dir: &Path) -> Result<ModelArtifacts, NerError> {
        self.artifacts.save_to(model_dir, tokenizer_dir)
    }
}

impl TokenTagger for OnnxTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, NerError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| NerError::Tokenizer(format!("tokenize: {e}")))?;

        let seq_len = encoding.get_ids().len();
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&mask| i64::from(mask))
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&tid| i64::from(tid))
            .collect();

        let shape = [
            1_i64,
            i64::try_from(seq_len)
                .map_err(|_| NerError::InvalidOutput(format!("sequence too long: {seq_len}")))?,
        ];

        let ids_tensor =
            Tensor::from_array((shape, input_ids.into_boxed_slice())).map_err(inference)?;
        let mask_tensor =
            Tensor::from_array((shape, attention_mask.into_boxed_slice())).map_err(inference)?;
        let type_tensor =
            Tensor::from_array((shape, token_type_ids.into_boxed_slice())).map_err(inference)?;

        let mut session = self.session.lock().map_err(|_| NerError::Lock)?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])
            .map_err(inference)?;

        // Logits: [1, seq_len, num_labels].
        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>().map_err(inference)?;
        let dims: &[i64] = output_shape;
        let num_labels = self.labels.len();
        if dims.len() != 3
            || usize::try_from(dims[1]).ok() != Some(seq_len)
            || usize::try_from(dims[2]).ok() != Some(num_labels)
        {
            return Err(NerError::InvalidOutput(format!(
                "unexpected logits shape {dims:?}, expected [1, {seq_len}, {num_labels}]"
            )));
        }

        let words = encoding.get_tokens();
        let offsets = encoding.get_offsets();
        let special = encoding.get_special_tokens_mask();

        let mut tokens = Vec::new();
        for (j, row) in logits.chunks_exact(num_labels).enumerate().take(seq_len) {
            if special[j] == 1 {
                continue;
            }
            let Some((class, score)) = softmax_argmax(row) else {
                continue;
            };
            let label = &self.labels[class];
            if label == OUTSIDE_LABEL {
                continue;
            }
            let (start, end) = offsets[j];
            tokens.push(TaggedToken {
                word: words[j].clone(),
                label: label.clone(),
                score,
                start: Some(start),
                end: Some(end),
            });
        }

        log::debug!("Tagged {} entity token(s) out of {seq_len}", tokens.len());

        Ok(tokens)
    }
}

/// Returns the index and softmax probability of the largest logit.
fn softmax_argmax(logits: &[f32]) -> Option<(usize, f32)> {
    let (best, &max) = logits
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    let sum: f32 = logits.iter().map(|&l| (l - max).exp()).sum();
    Some((best, 1.0 / sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn softmax_argmax_picks_largest() {
        let (idx, score) = softmax_argmax(&[0.1, 3.0, -1.0]).unwrap();
        assert_eq!(idx, 1);
        assert!(score > 0.5 && score <= 1.0, "score {score}");
    }

    #[test]
    fn softmax_argmax_uniform() {
        let (_, score) = softmax_argmax(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert!((score - 0.25).abs() < 1e-6);
    }

    #[test]
    fn softmax_argmax_empty() {
        assert!(softmax_argmax(&[]).is_none());
    }

    #[test]
    fn load_fails_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxTagger::load_from(&dir.path().join("model"), &dir.path().join("tokenizer"))
            .unwrap_err();
        assert!(matches!(err, NerError::MissingArtifact(_)));
    }

    fn model_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("police_ner_model")
    }

    #[test]
    #[ignore = "requires a downloaded model in police_ner_model/"]
    fn tags_organizations_with_real_model() {
        let root = model_root();
        let tagger = OnnxTagger::load_from(&root.join("model"), &root.join("tokenizer")).unwrap();
        let tokens = tagger
            .tag("A laptop was stolen from the Microsoft office in Seattle.")
            .unwrap();
        assert!(
            tokens.iter().any(|t| t.label.ends_with("ORG")),
            "expected an organization in {tokens:?}"
        );
    }
}
