//! Building the extractor the CLI runs with.
//!
//! A saved model directory holds the ONNX model, its tokenizer and the
//! extractor configuration (see [`report_ner_extract::layout`]).  When it
//! cannot be loaded, a fresh pretrained model is downloaded into it and the
//! default configuration is saved alongside, so the next run loads
//! directly.

use std::error::Error;
use std::path::Path;

use report_ner_extract::{ReportExtractor, layout, persist};
use report_ner_ner::{EntityClass, StaticTagger, TokenTagger};
use report_ner_report_models::ExtractorConfig;

/// Extractor with the tagger chosen at runtime.
pub type DynExtractor = ReportExtractor<Box<dyn TokenTagger>>;

/// Builds an extractor that tags only the crime vocabulary, without a
/// model. The configuration is read from `model_dir` when present.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn lexicon_extractor(model_dir: &Path) -> Result<DynExtractor, Box<dyn Error>> {
    let config = load_config_or_default(model_dir);
    let tagger = StaticTagger::new().with_entries(&config.crime_vocabulary, &EntityClass::Misc.begin_label());
    Ok(ReportExtractor::new(config, Box::new(tagger) as Box<dyn TokenTagger>)?)
}

/// Reads the saved configuration under `model_dir`, falling back to the
/// default patterns.
#[must_use]
pub fn load_config_or_default(model_dir: &Path) -> ExtractorConfig {
    match persist::deserialize(model_dir) {
        Ok(config) => config,
        Err(e) => {
            log::debug!(
                "Using default patterns ({} not loaded: {e})",
                layout::patterns_path(model_dir).display()
            );
            ExtractorConfig::default()
        }
    }
}

#[cfg(feature = "onnx")]
mod onnx {
    use std::error::Error;
    use std::path::Path;

    use report_ner_extract::{ReportExtractor, layout, persist};
    use report_ner_ner::{OnnxTagger, TokenTagger, hub};
    use report_ner_report_models::ExtractorConfig;

    use super::DynExtractor;

    /// Loads the configuration and model saved under `root`.
    fn load_saved(root: &Path) -> Result<(ExtractorConfig, OnnxTagger), Box<dyn Error>> {
        let config = persist::deserialize(root)?;
        let tagger = OnnxTagger::load_from(&layout::model_dir(root), &layout::tokenizer_dir(root))?;
        Ok((config, tagger))
    }

    /// Downloads `model_id` into `root` and saves the default
    /// configuration next to it.
    async fn init_pretrained(
        model_id: &str,
        root: &Path,
    ) -> Result<(ExtractorConfig, OnnxTagger), Box<dyn Error>> {
        hub::download_pretrained(model_id, &layout::model_dir(root), &layout::tokenizer_dir(root))
            .await?;

        let config = ExtractorConfig::default();
        persist::serialize(&config, root)?;
        log::info!("Model saved to {}", root.display());

        let tagger = OnnxTagger::load_from(&layout::model_dir(root), &layout::tokenizer_dir(root))?;
        Ok((config, tagger))
    }

    /// Loads the model saved under `root`, or downloads `model_id` into
    /// `root` if that fails.
    pub async fn load_or_init(
        root: &Path,
        model_id: &str,
    ) -> Result<(ExtractorConfig, OnnxTagger), Box<dyn Error>> {
        match load_saved(root) {
            Ok(loaded) => {
                log::info!("Successfully loaded model from {}", root.display());
                Ok(loaded)
            }
            Err(e) => {
                log::warn!("Error loading model: {e}");
                log::info!("Initializing a new model instead...");
                init_pretrained(model_id, root).await
            }
        }
    }

    /// Saves the configuration and model files under `root`.
    pub fn save(
        config: &ExtractorConfig,
        tagger: &OnnxTagger,
        root: &Path,
    ) -> Result<(), Box<dyn Error>> {
        persist::serialize(config, root)?;
        tagger.save(&layout::model_dir(root), &layout::tokenizer_dir(root))?;
        log::info!("Model saved to {}", root.display());
        Ok(())
    }

    /// Builds an extractor backed by the pretrained model.
    pub async fn model_extractor(root: &Path, model_id: &str) -> Result<DynExtractor, Box<dyn Error>> {
        let (config, tagger) = load_or_init(root, model_id).await?;
        Ok(ReportExtractor::new(config, Box::new(tagger) as Box<dyn TokenTagger>)?)
    }
}

#[cfg(feature = "onnx")]
pub use onnx::model_extractor;

/// Makes sure a model is saved under `model_dir` (downloading `model_id`
/// if needed) and optionally copies it, with its patterns, to `output`.
///
/// # Errors
///
/// Returns an error if the model cannot be loaded, downloaded or saved.
#[cfg(feature = "onnx")]
pub async fn save_model(
    model_dir: &Path,
    model_id: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let (config, tagger) = onnx::load_or_init(model_dir, model_id).await?;
    if let Some(output) = output {
        onnx::save(&config, &tagger, output)?;
    }
    Ok(())
}

/// Without the `onnx` feature there is no model to save.
///
/// # Errors
///
/// Always returns an error.
#[cfg(not(feature = "onnx"))]
#[allow(clippy::unused_async)]
pub async fn save_model(
    _model_dir: &Path,
    _model_id: &str,
    _output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    Err("saving a model requires the `onnx` feature".into())
}

/// Builds the extractor for a run: the lexicon tagger when `no_model` is
/// set, otherwise the pretrained model.
///
/// # Errors
///
/// Returns an error if the model can neither be loaded nor downloaded.
#[cfg(feature = "onnx")]
pub async fn build_extractor(
    model_dir: &Path,
    model_id: &str,
    no_model: bool,
) -> Result<DynExtractor, Box<dyn Error>> {
    if no_model {
        return lexicon_extractor(model_dir);
    }
    model_extractor(model_dir, model_id).await
}

/// Builds the extractor for a run. Without the `onnx` feature only the
/// lexicon tagger is available.
///
/// # Errors
///
/// Returns an error if the saved configuration is invalid.
#[cfg(not(feature = "onnx"))]
#[allow(clippy::unused_async)]
pub async fn build_extractor(
    model_dir: &Path,
    model_id: &str,
    no_model: bool,
) -> Result<DynExtractor, Box<dyn Error>> {
    if !no_model {
        log::warn!("Built without the `onnx` feature; tagging with the crime vocabulary instead of {model_id}");
    }
    lexicon_extractor(model_dir)
}
