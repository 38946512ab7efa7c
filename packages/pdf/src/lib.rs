#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PDF text extraction for police reports.
//!
//! Reports are frequently distributed as PDFs.  This crate pulls the text
//! out of every page using pure-Rust extraction ([`pdf_extract`]) and
//! concatenates the pages in document order, each followed by a newline,
//! so the result can be fed straight into the field extractor.
//!
//! [`collect_text`] is the lenient entry point used by the extraction
//! pipeline: any failure is logged and replaced with an empty string.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Errors specific to PDF text extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// Reading the PDF file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),
}

/// Extracts the text of every page of the PDF at `path`.
///
/// # Errors
///
/// Returns [`PdfError::Io`] if the file cannot be read, or
/// [`PdfError::Extraction`] if the bytes are not a readable PDF.
pub fn extract_text(path: impl AsRef<Path>) -> Result<String, PdfError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    extract_text_from_mem(&bytes)
}

/// Extracts the text of every page of an in-memory PDF.
///
/// # Errors
///
/// Returns [`PdfError::Extraction`] if the bytes are not a readable PDF.
pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String, PdfError> {
    // pdf-extract panics on some malformed documents instead of erroring.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| PdfError::Extraction("PDF parser panicked on malformed input".to_owned()))?
    .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    let text = join_pages(&pages);

    log::debug!(
        "Extracted {} characters of text from {} page(s)",
        text.len(),
        pages.len()
    );

    Ok(text)
}

/// Extracts the text of the PDF at `path`, returning an empty string on
/// any failure.
///
/// The failure is logged at `error` level and extraction continues on
/// empty text, which yields an empty result downstream.
#[must_use]
pub fn collect_text(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Error extracting text from PDF {}: {e}", path.display());
            String::new()
        }
    }
}

/// Concatenates page texts in order, each followed by a newline.
fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.as_ref().len() + 1).sum());
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text
}
