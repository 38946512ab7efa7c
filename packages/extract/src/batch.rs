//! Batch extraction over report files.
//!
//! Every input is read (PDFs through the PDF collector, anything else as
//! UTF-8 text), run through the extractor, and written as pretty JSON to
//! `<stem>_extracted.json` next to the input.  A failing input is logged
//! and counted; it never stops the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use report_ner_ner::TokenTagger;
use report_ner_report_models::ExtractionResult;
use thiserror::Error;

use crate::ReportExtractor;
use crate::progress::ProgressCallback;

/// Suffix appended to the input file stem for the output file.
pub const OUTPUT_SUFFIX: &str = "_extracted.json";

/// Errors that can occur while writing a result.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Writing the output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The result could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Output files written, in input order.
    pub written: Vec<PathBuf>,
    /// Inputs whose output could not be written.
    pub failed: Vec<PathBuf>,
}

/// Returns `<dir>/<stem>_extracted.json` for `input`.
#[must_use]
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "report".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Whether `path` has a `.pdf` extension (any case).
#[must_use]
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Renders `result` as JSON with two-space indentation, keeping field
/// order.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if serialization fails.
pub fn to_json(result: &ExtractionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Writes `result` as pretty JSON to `path`.
///
/// # Errors
///
/// Returns [`BatchError`] if serialization or the write fails.
pub fn write_result(result: &ExtractionResult, path: &Path) -> Result<(), BatchError> {
    std::fs::write(path, to_json(result)?)?;
    Ok(())
}

/// Extracts a single report file, choosing PDF or text reading by
/// extension. Unreadable files yield an empty result.
pub fn extract_file<T: TokenTagger>(extractor: &ReportExtractor<T>, path: &Path) -> ExtractionResult {
    if is_pdf(path) {
        return extractor.extract_pdf(path);
    }

    match std::fs::read_to_string(path) {
        Ok(text) => extractor.extract(&text),
        Err(e) => {
            log::error!("Error reading report {}: {e}", path.display());
            extractor.extract("")
        }
    }
}

/// Extracts every input and writes one JSON file per input.
pub fn run_batch<T: TokenTagger>(
    extractor: &ReportExtractor<T>,
    inputs: &[PathBuf],
    progress: &Arc<dyn ProgressCallback>,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    progress.set_total(inputs.len() as u64);

    for input in inputs {
        progress.set_message(input.display().to_string());

        let result = extract_file(extractor, input);
        let output = output_path(input);

        match write_result(&result, &output) {
            Ok(()) => {
                log::info!(
                    "Extracted {} field(s) from {} -> {}",
                    result.len(),
                    input.display(),
                    output.display()
                );
                summary.written.push(output);
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", output.display());
                summary.failed.push(input.clone());
            }
        }

        progress.inc(1);
    }

    progress.finish(format!(
        "{} report(s) extracted, {} failed",
        summary.written.len(),
        summary.failed.len()
    ));

    summary
}

#[cfg(test)]
mod tests {
    use report_ner_ner::StaticTagger;
    use report_ner_report_models::ExtractorConfig;

    use super::*;
    use crate::progress::null_progress;

    fn extractor() -> ReportExtractor<StaticTagger> {
        ReportExtractor::new(ExtractorConfig::default(), StaticTagger::new()).unwrap()
    }

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("reports/police_crime_report_10.pdf")),
            Path::new("reports/police_crime_report_10_extracted.json")
        );
        assert_eq!(
            output_path(Path::new("report.txt")),
            Path::new("report_extracted.json")
        );
    }

    #[test]
    fn detects_pdf_extension() {
        assert!(is_pdf(Path::new("a.pdf")));
        assert!(is_pdf(Path::new("a.PDF")));
        assert!(!is_pdf(Path::new("a.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn json_is_pretty_and_ordered() {
        let mut result = ExtractionResult::new();
        result.insert("report_number", "1");
        result.insert("date_time", "today");
        assert_eq!(
            to_json(&result).unwrap(),
            "{\n  \"report_number\": \"1\",\n  \"date_time\": \"today\"\n}"
        );
    }

    #[test]
    fn batch_writes_one_file_per_input() {
        let tmp = tempfile::tempdir().unwrap();
        let text_report = tmp.path().join("a.txt");
        std::fs::write(&text_report, "Report Number: A-1\nPolice District: South\n").unwrap();
        let broken_pdf = tmp.path().join("b.pdf");
        std::fs::write(&broken_pdf, b"not a pdf").unwrap();

        let summary = run_batch(
            &extractor(),
            &[text_report, broken_pdf],
            &null_progress(),
        );

        assert!(summary.failed.is_empty());
        assert_eq!(summary.written.len(), 2);

        let a: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary.written[0]).unwrap()).unwrap();
        assert_eq!(a["report_number"], "A-1");
        assert_eq!(a["police_district"], "South");

        let b = std::fs::read_to_string(&summary.written[1]).unwrap();
        assert_eq!(b, "{}");
    }

    #[test]
    fn missing_text_input_yields_empty_result() {
        let tmp = tempfile::tempdir().unwrap();
        let result = extract_file(&extractor(), &tmp.path().join("missing.txt"));
        assert!(result.is_empty());
    }

    #[test]
    fn unwritable_output_is_counted_as_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("c.txt");
        std::fs::write(&input, "Report Number: C-3\n").unwrap();
        // A directory where the output file should go blocks the write.
        std::fs::create_dir(output_path(&input)).unwrap();

        let summary = run_batch(&extractor(), std::slice::from_ref(&input), &null_progress());

        assert!(summary.written.is_empty());
        assert_eq!(summary.failed, vec![input]);
    }
}
