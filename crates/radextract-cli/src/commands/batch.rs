use radextract_core::error::RadExtractError;
use radextract_core::export;
use radextract_core::parsing::parse_batch;
use radextract_core::pipeline::{run_batch, BatchProgress};
use std::path::{Path, PathBuf};

use crate::output;
use crate::ServiceArgs;

pub fn run(
    service: &ServiceArgs,
    input_file: PathBuf,
    out: Option<PathBuf>,
    output_format: &str,
) -> Result<(), RadExtractError> {
    // Reject oversized or empty uploads before configuring the service
    let csv_text = std::fs::read_to_string(&input_file)?;
    let parsed = parse_batch(&csv_text)?;
    for skipped in &parsed.skipped_lines {
        eprintln!(
            "  warning: line {} skipped: {}",
            skipped.line_number, skipped.reason
        );
    }

    let extractor = super::build_extractor(service)?;

    let progress: &dyn Fn(BatchProgress) = &super::print_progress;
    let outcome = run_batch(&parsed.rows, &extractor, Some(progress));

    eprint!("{}", output::table::format_batch_report(&outcome));

    if outcome.records.is_empty() {
        eprintln!("No records accepted, nothing exported.");
    } else {
        let path = match out {
            Some(path) => {
                std::fs::write(&path, export::render(&outcome.records)?)?;
                path
            }
            None => export::write_export(
                Path::new("."),
                &outcome.records,
                chrono::Utc::now().timestamp_millis(),
            )?,
        };
        eprintln!(
            "Exported {} record(s) to {}",
            outcome.records.len(),
            path.display()
        );
    }

    match output_format {
        "json" => output::json::print(&outcome)?,
        _ => print!("{}", output::table::format_summary(&outcome.records)),
    }

    Ok(())
}
