pub mod reader;

use crate::error::RadExtractError;
use crate::model::RawRow;
use serde::{Deserialize, Serialize};
pub use reader::{read_records, CsvRecord};

/// Maximum number of data rows accepted in one upload.
pub const MAX_BATCH_ROWS: usize = 500;

/// Rows parsed from an uploaded CSV, plus lines that were dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedBatch {
    pub rows: Vec<RawRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

/// A line that could not be turned into a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub reason: String,
}

/// Parse an uploaded `PatientID,OrderID,Report_Text` CSV into rows.
///
/// The first non-blank line is always treated as the header and dropped.
/// Column count is not validated: missing trailing fields become empty
/// strings and are dealt with by the pipeline. Lines with no field content
/// are skipped rather than failing the batch.
pub fn parse_batch(text: &str) -> Result<ParsedBatch, RadExtractError> {
    let mut rows = Vec::new();
    let mut skipped_lines = Vec::new();

    for record in read_records(text).into_iter().skip(1) {
        if record.is_empty() {
            skipped_lines.push(SkippedLine {
                line_number: record.line_number,
                reason: "no fields found".into(),
            });
            continue;
        }

        rows.push(RawRow::new(record.field(0), record.field(1), record.field(2)));
    }

    if rows.len() > MAX_BATCH_ROWS {
        return Err(RadExtractError::TooManyRecords {
            count: rows.len(),
            limit: MAX_BATCH_ROWS,
        });
    }

    if rows.is_empty() {
        return Err(RadExtractError::EmptyBatch);
    }

    Ok(ParsedBatch {
        rows,
        skipped_lines,
    })
}
