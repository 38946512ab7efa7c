#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for police report extraction.
//!
//! Reads PDF or text reports, extracts structured fields plus NER-derived
//! crime types and stolen items, prints the result as JSON and saves it to
//! `<name>_extracted.json` next to each input.
//!
//! Uses `indicatif-log-bridge` (via [`report_ner_cli_utils::init_logger`])
//! so that log lines and the batch progress bar never fight for the
//! terminal.

mod model;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use report_ner_cli_utils::IndicatifProgress;
use report_ner_extract::ReportExtractor;
use report_ner_extract::batch::{self, extract_file, output_path, write_result};
use report_ner_extract::layout::DEFAULT_MODEL_DIR;
use report_ner_ner::{DEFAULT_MODEL_ID, TokenTagger};

/// Report processed when no input is given.
const DEFAULT_REPORT: &str = "police_crime_report_10.pdf";

#[derive(Parser)]
#[command(name = "report_ner", about = "Police report field and entity extraction")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ModelArgs {
    /// Directory the model and field patterns are loaded from (and saved
    /// to when a fresh model is downloaded)
    #[arg(long, env = "REPORT_NER_MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,
    /// Pretrained token-classification model to download when no saved
    /// model can be loaded
    #[arg(long, env = "REPORT_NER_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    model_id: String,
    /// Skip the NER model and tag only the crime vocabulary
    #[arg(long)]
    no_model: bool,
}

impl Default for ModelArgs {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_id: DEFAULT_MODEL_ID.to_owned(),
            no_model: false,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract reports (PDF or text) and write `<name>_extracted.json` for each
    Extract {
        /// Report files. Defaults to `police_crime_report_10.pdf`.
        paths: Vec<PathBuf>,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Extract a plain-text report and print the result as JSON
    Text {
        /// Text file containing one report
        file: PathBuf,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Download the pretrained model and save it with the field patterns
    SaveModel {
        #[command(flatten)]
        model: ModelArgs,
        /// Copy the saved model to this directory as well
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the field patterns the extractor applies
    Patterns {
        /// Directory holding saved field patterns
        #[arg(long, env = "REPORT_NER_MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
        model_dir: PathBuf,
    },
}

/// Returns the first input that does not exist.
fn first_missing(paths: &[PathBuf]) -> Option<&Path> {
    paths.iter().map(PathBuf::as_path).find(|path| !path.exists())
}

/// User-facing message for a missing input, worded by input kind.
fn missing_input_message(path: &Path) -> String {
    let kind = if batch::is_pdf(path) { "PDF" } else { "Text" };
    format!("Error: {kind} file '{}' not found.", path.display())
}

/// Exits with status 1 if any input is missing.
fn require_inputs(paths: &[PathBuf]) {
    if let Some(path) = first_missing(paths) {
        eprintln!("{}", missing_input_message(path));
        eprintln!("Please ensure the file is in the current directory.");
        std::process::exit(1);
    }
}

/// Extracts `path`, prints the result and saves it next to the input.
///
/// Returns the output path, or `None` if the result could not be saved.
/// A failed save is logged and never aborts the run.
fn print_and_save<T: TokenTagger>(extractor: &ReportExtractor<T>, path: &Path) -> Option<PathBuf> {
    let result = extract_file(extractor, path);

    match batch::to_json(&result) {
        Ok(json) => {
            println!("Extracted Information:");
            println!("{json}");
        }
        Err(e) => log::error!("Error processing PDF: {e}"),
    }

    let output = output_path(path);
    match write_result(&result, &output) {
        Ok(()) => {
            println!("Results saved to {}", output.display());
            Some(output)
        }
        Err(e) => {
            log::error!("Error processing PDF: {e}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = report_ner_cli_utils::init_logger();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| Commands::Extract {
        paths: Vec::new(),
        model: ModelArgs::default(),
    });

    match command {
        Commands::Extract { mut paths, model: args } => {
            if paths.is_empty() {
                paths.push(PathBuf::from(DEFAULT_REPORT));
            }
            require_inputs(&paths);

            let extractor =
                model::build_extractor(&args.model_dir, &args.model_id, args.no_model).await?;

            if let [path] = paths.as_slice() {
                log::info!("Testing NER on '{}'...", path.display());
                print_and_save(&extractor, path);
            } else {
                let progress = IndicatifProgress::reports_bar(&multi, "Extracting reports");
                let summary = batch::run_batch(&extractor, &paths, &progress);
                for output in &summary.written {
                    println!("Results saved to {}", output.display());
                }
                if !summary.failed.is_empty() {
                    log::error!("{} report(s) could not be saved", summary.failed.len());
                }
            }
        }
        Commands::Text { file, model: args } => {
            require_inputs(std::slice::from_ref(&file));

            let extractor =
                model::build_extractor(&args.model_dir, &args.model_id, args.no_model).await?;
            println!("{}", batch::to_json(&extract_file(&extractor, &file))?);
        }
        Commands::SaveModel {
            model: args,
            output,
        } => {
            model::save_model(&args.model_dir, &args.model_id, output.as_deref()).await?;
        }
        Commands::Patterns { model_dir } => {
            let config = model::load_config_or_default(&model_dir);
            println!("{:<22} PATTERN", "FIELD");
            println!("{}", "-".repeat(60));
            for pattern in &config.patterns {
                println!("{:<22} {}", pattern.name, pattern.pattern);
            }
            println!();
            println!("Crime vocabulary: {}", config.crime_vocabulary.join(", "));
        }
    }

    Ok(())
}
