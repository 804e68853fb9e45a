use serde::Serialize;
use std::time::Instant;

use crate::error::RadExtractError;
use crate::extraction::ReportExtractor;
use crate::model::{RawRow, SessionRecord};

/// Progress after a row has been handled, whatever its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

/// A row whose extraction call failed.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// Zero-based position in the input rows.
    pub index: usize,
    pub key_id: String,
    pub error: String,
}

/// Result of a batch run. Row-level problems are reported here, never as an
/// error from [`run_batch`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    /// Accepted records, in input order.
    pub records: Vec<SessionRecord>,
    pub failures: Vec<RowFailure>,
    /// Indices of rows with no report text.
    pub skipped_empty: Vec<usize>,
    /// Indices of rows the service classified as not a radiology report.
    pub rejected: Vec<usize>,
    pub duration_ms: u64,
}

/// Run every row through the extractor, sequentially and in input order.
///
/// `progress` is called once per row, after the row is handled, so
/// `completed` rises by one each call and ends at `total`. Report text that
/// is empty or whitespace-only counts as empty: the row is skipped without a
/// service call.
pub fn run_batch(
    rows: &[RawRow],
    extractor: &dyn ReportExtractor,
    progress_fn: Option<&dyn Fn(BatchProgress)>,
) -> BatchOutcome {
    let start = Instant::now();
    let total = rows.len();
    let mut outcome = BatchOutcome {
        total,
        ..Default::default()
    };

    tracing::info!(rows = total, backend = extractor.backend_name(), "batch started");

    for (index, row) in rows.iter().enumerate() {
        process_row(index, row, extractor, &mut outcome);

        if let Some(progress) = progress_fn {
            progress(BatchProgress {
                completed: index + 1,
                total,
            });
        }
    }

    outcome.duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        accepted = outcome.records.len(),
        failed = outcome.failures.len(),
        rejected = outcome.rejected.len(),
        skipped = outcome.skipped_empty.len(),
        duration_ms = outcome.duration_ms,
        "batch finished"
    );

    outcome
}

fn process_row(
    index: usize,
    row: &RawRow,
    extractor: &dyn ReportExtractor,
    outcome: &mut BatchOutcome,
) {
    if row.report_text.trim().is_empty() {
        tracing::debug!(row = index, "skipping row with empty report text");
        outcome.skipped_empty.push(index);
        return;
    }

    let extraction = match extractor.extract(&row.report_text) {
        Ok(extraction) => extraction,
        Err(e) => {
            tracing::warn!(row = index, key_id = %row.key_id, error = %e, "extraction failed, skipping row");
            outcome.failures.push(RowFailure {
                index,
                key_id: row.key_id.clone(),
                error: e.to_string(),
            });
            return;
        }
    };

    if extraction.is_rejected() {
        tracing::info!(row = index, "service classified row as not a radiology report, dropping");
        outcome.rejected.push(index);
        return;
    }

    outcome.records.push(SessionRecord::new(
        or_placeholder(&row.key_id, "PAT", index),
        or_placeholder(&row.order_id, "ORD", index),
        row.report_text.clone(),
        extraction,
    ));
}

/// `PAT-3` style placeholder (1-based) for a missing identifier.
fn or_placeholder(value: &str, prefix: &str, index: usize) -> String {
    if value.trim().is_empty() {
        format!("{prefix}-{}", index + 1)
    } else {
        value.to_string()
    }
}

/// Manual single-report extraction.
///
/// Unlike batch mode every problem is returned to the caller, including a
/// report the service flags as not a radiology report.
pub fn extract_manual(
    key_id: &str,
    order_id: &str,
    text: &str,
    extractor: &dyn ReportExtractor,
) -> Result<SessionRecord, RadExtractError> {
    if key_id.trim().is_empty() {
        return Err(RadExtractError::MissingKeyId);
    }
    if text.trim().is_empty() {
        return Err(RadExtractError::EmptyReportText);
    }

    let extraction = extractor.extract(text)?;
    if extraction.is_rejected() {
        return Err(RadExtractError::NotAMedicalReport);
    }

    Ok(SessionRecord::new(
        key_id.trim(),
        order_id.trim(),
        text,
        extraction,
    ))
}
