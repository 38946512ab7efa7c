//! Canonical paths inside a saved model directory.
//!
//! ```text
//! <root>/
//!   model/          model.onnx, config.json
//!   tokenizer/      tokenizer.json
//!   patterns.toml   serialized extractor configuration
//! ```

use std::path::{Path, PathBuf};

/// Default directory a model is saved to and loaded from.
pub const DEFAULT_MODEL_DIR: &str = "police_ner_model";

/// Returns the model weights directory under `root`.
#[must_use]
pub fn model_dir(root: &Path) -> PathBuf {
    root.join("model")
}

/// Returns the tokenizer directory under `root`.
#[must_use]
pub fn tokenizer_dir(root: &Path) -> PathBuf {
    root.join("tokenizer")
}

/// Returns the path of the serialized extractor configuration.
#[must_use]
pub fn patterns_path(root: &Path) -> PathBuf {
    root.join("patterns.toml")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_root() {
        let root = Path::new(DEFAULT_MODEL_DIR);
        assert_eq!(model_dir(root), Path::new("police_ner_model/model"));
        assert_eq!(tokenizer_dir(root), Path::new("police_ner_model/tokenizer"));
        assert_eq!(patterns_path(root), Path::new("police_ner_model/patterns.toml"));
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
