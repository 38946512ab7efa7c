//! Saving and restoring the extractor configuration.
//!
//! The configuration (field patterns and crime vocabulary) is stored as
//! TOML next to the model files, independently of the model's own
//! serialization.  Restoring it yields an extractor that behaves exactly
//! like the one that was saved.

use std::path::{Path, PathBuf};

use report_ner_report_models::ExtractorConfig;
use thiserror::Error;

use crate::fields::FieldExtractor;
use crate::{ConfigError, layout};

/// Errors that can occur while saving or loading a configuration.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`ExtractorConfig`].
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The configuration is structurally invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Writes `config` to `<root>/patterns.toml`, creating `root` if needed.
///
/// # Errors
///
/// Returns [`PersistError`] if the configuration is invalid or cannot be
/// written.
pub fn serialize(config: &ExtractorConfig, root: &Path) -> Result<PathBuf, PersistError> {
    FieldExtractor::new(&config.patterns)?;

    layout::ensure_dir(root)?;
    let path = layout::patterns_path(root);
    std::fs::write(&path, toml::to_string_pretty(config)?)?;

    log::debug!(
        "Saved {} field pattern(s) to {}",
        config.patterns.len(),
        path.display()
    );

    Ok(path)
}

/// Reads the configuration saved under `root`.
///
/// # Errors
///
/// Returns [`PersistError`] if the file is missing, unparseable, or
/// describes an invalid configuration.
pub fn deserialize(root: &Path) -> Result<ExtractorConfig, PersistError> {
    let path = layout::patterns_path(root);
    let raw = std::fs::read_to_string(&path)?;
    let config: ExtractorConfig = toml::from_str(&raw)?;

    FieldExtractor::new(&config.patterns)?;

    log::debug!(
        "Loaded {} field pattern(s) from {}",
        config.patterns.len(),
        path.display()
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use report_ner_report_models::FieldPattern;

    use super::*;

    #[test]
    fn round_trips_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("saved");

        let config = ExtractorConfig::default();
        let path = serialize(&config, &root).unwrap();

        assert_eq!(path, layout::patterns_path(&root));
        assert_eq!(deserialize(&root).unwrap(), config);
    }

    #[test]
    fn round_trips_custom_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ExtractorConfig {
            crime_vocabulary: vec!["arson".to_owned()],
            patterns: vec![FieldPattern::new("case_id", r#"Case "ID":\s*(\d+)"#)],
        };

        serialize(&config, tmp.path()).unwrap();

        assert_eq!(deserialize(tmp.path()).unwrap(), config);
    }

    #[test]
    fn refuses_to_save_invalid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ExtractorConfig {
            crime_vocabulary: Vec::new(),
            patterns: vec![FieldPattern::new("a", "no group")],
        };

        let err = serialize(&config, tmp.path()).unwrap_err();
        assert!(matches!(err, PersistError::Config(_)));
        assert!(!layout::patterns_path(tmp.path()).exists());
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            deserialize(tmp.path()).unwrap_err(),
            PersistError::Io(_)
        ));
    }

    #[test]
    fn rejects_duplicate_names_on_load() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            layout::patterns_path(tmp.path()),
            "[[patterns]]\nname = \"a\"\npattern = 'A:(.*)'\n\n[[patterns]]\nname = \"a\"\npattern = 'B:(.*)'\n",
        )
        .unwrap();

        assert!(matches!(
            deserialize(tmp.path()).unwrap_err(),
            PersistError::Config(ConfigError::DuplicateField(_))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(layout::patterns_path(tmp.path()), "patterns = 3").unwrap();

        assert!(matches!(
            deserialize(tmp.path()).unwrap_err(),
            PersistError::Parse(_)
        ));
    }
}
