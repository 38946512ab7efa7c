//! Pretrained model download from the `HuggingFace` hub.
//!
//! Fetches the ONNX export, model config and tokenizer of a token
//! classification model (e.g. `dslim/bert-base-NER`) into local model and
//! tokenizer directories.

use std::path::Path;

use crate::NerError;
use crate::artifacts::ModelArtifacts;

/// Base URL for raw file downloads from the hub.
pub const HUB_BASE_URL: &str = "https://huggingface.co";

/// Repository-relative location of the ONNX export.
pub const REMOTE_MODEL_FILE: &str = "onnx/model.onnx";
/// Repository-relative location of the model config.
pub const REMOTE_CONFIG_FILE: &str = "config.json";
/// Repository-relative location of the tokenizer.
pub const REMOTE_TOKENIZER_FILE: &str = "tokenizer.json";

/// Builds the download URL for `file` in the `main` revision of `model_id`.
#[must_use]
pub fn resolve_url(model_id: &str, file: &str) -> String {
    format!(
        "{HUB_BASE_URL}/{}/resolve/main/{}",
        model_id.trim_matches('/'),
        file.trim_start_matches('/')
    )
}

/// Downloads the artifacts of `model_id` into `model_dir` and
/// `tokenizer_dir`, creating them if necessary.
///
/// # Errors
///
/// Returns [`NerError::Http`] if any request fails or returns a non-success
/// status, or [`NerError::Io`] if a file cannot be written.
pub async fn download_pretrained(
    model_id: &str,
    model_dir: &Path,
    tokenizer_dir: &Path,
) -> Result<ModelArtifacts, NerError> {
    let target = ModelArtifacts::in_dirs(model_dir, tokenizer_dir);
    std::fs::create_dir_all(model_dir)?;
    std::fs::create_dir_all(tokenizer_dir)?;

    let client = reqwest::Client::new();

    for (remote, local) in [
        (REMOTE_MODEL_FILE, &target.model),
        (REMOTE_CONFIG_FILE, &target.config),
        (REMOTE_TOKENIZER_FILE, &target.tokenizer),
    ] {
        let url = resolve_url(model_id, remote);
        log::info!("Downloading {url}");

        let response = client.get(&url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        std::fs::write(local, &bytes)?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), local.display());
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_hub_urls() {
        assert_eq!(
            resolve_url("dslim/bert-base-NER", REMOTE_MODEL_FILE),
            "https://huggingface.co/dslim/bert-base-NER/resolve/main/onnx/model.onnx"
        );
        assert_eq!(
            resolve_url("/org/model/", "/tokenizer.json"),
            "https://huggingface.co/org/model/resolve/main/tokenizer.json"
        );
    }
}
