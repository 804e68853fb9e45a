pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod session;
pub mod workflow;

use error::RadExtractError;
use extraction::ReportExtractor;
use pipeline::{BatchOutcome, BatchProgress};

/// Main batch entry point: parse an uploaded CSV and extract every row.
///
/// Fails only on upload-level problems (`TooManyRecords`, `EmptyBatch`), in
/// which case no extraction call is made. Row-level failures are collected
/// in the returned outcome.
pub fn process_csv(
    csv_text: &str,
    extractor: &dyn ReportExtractor,
    progress_fn: Option<&dyn Fn(BatchProgress)>,
) -> Result<BatchOutcome, RadExtractError> {
    let parsed = parsing::parse_batch(csv_text)?;

    for skipped in &parsed.skipped_lines {
        tracing::warn!(line = skipped.line_number, reason = %skipped.reason, "skipped CSV line");
    }

    Ok(pipeline::run_batch(&parsed.rows, extractor, progress_fn))
}
