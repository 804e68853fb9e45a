use chrono::SecondsFormat;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::RadExtractError;
use crate::model::SessionRecord;

/// Leading columns of the pivoted export, before the organ columns.
pub const FIXED_COLUMNS: [&str; 4] = ["Key ID", "Timestamp", "Raw Report", "Impression"];

pub const TEMPLATE_HEADER: &str = "PatientID,OrderID,Report_Text";

const BOM: char = '\u{feff}';

/// Every distinct organ across all records, ordinal-sorted.
pub fn organ_columns(records: &[SessionRecord]) -> Vec<&str> {
    records
        .iter()
        .flat_map(|r| r.extraction.findings.iter().map(|f| f.organ.as_str()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// All of a record's findings for one organ, `" | "`-joined.
pub fn organ_cell(record: &SessionRecord, organ: &str) -> String {
    record
        .extraction
        .findings_for(organ)
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Render records as a pivoted CSV with one column per organ.
///
/// Every field is quoted and the output starts with a UTF-8 BOM so
/// spreadsheet tools pick the right encoding. Rows are joined with `\n`
/// and there is no trailing newline. Same records in the same order always
/// render the same bytes.
pub fn render(records: &[SessionRecord]) -> Result<String, RadExtractError> {
    let organs = organ_columns(records);

    let buf = BOM.to_string().into_bytes();
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);

    writer.write_record(FIXED_COLUMNS.iter().copied().chain(organs.iter().copied()))?;

    for record in records {
        let timestamp = record
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let impression = record.extraction.impression.as_deref().unwrap_or("");

        let mut fields = vec![
            record.key_id.clone(),
            timestamp,
            record.raw_text.clone(),
            impression.to_string(),
        ];
        fields.extend(organs.iter().map(|organ| organ_cell(record, organ)));
        writer.write_record(&fields)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut out = String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    // drop the terminator after the last row
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// `radiology_data_export_<epoch-millis>.csv`
pub fn export_filename(epoch_millis: i64) -> String {
    format!("radiology_data_export_{epoch_millis}.csv")
}

/// Render `records` and write them into `dir` under [`export_filename`].
pub fn write_export(
    dir: &Path,
    records: &[SessionRecord],
    epoch_millis: i64,
) -> Result<PathBuf, RadExtractError> {
    let path = dir.join(export_filename(epoch_millis));
    std::fs::write(&path, render(records)?)?;
    tracing::info!(path = %path.display(), records = records.len(), "export written");
    Ok(path)
}

/// Downloadable upload template: header plus two example rows.
pub fn template() -> String {
    [
        TEMPLATE_HEADER,
        "P-101,ORD-501,\"CHEST X-RAY: Clear lungs. Heart size is normal. No pleural effusion.\"",
        "P-102,ORD-502,\"CT ABDOMEN: 2 cm hypodense lesion in the liver, likely cyst. Gallbladder unremarkable.\"",
    ]
    .join("\n")
        + "\n"
}
