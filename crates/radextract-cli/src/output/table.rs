use radextract_core::export::{organ_cell, organ_columns};
use radextract_core::model::SessionRecord;
use radextract_core::pipeline::BatchOutcome;
use std::fmt::Write;

/// Review of a single extraction, one block per finding.
pub fn format_review(record: &SessionRecord) -> String {
    let mut out = String::new();
    let extraction = &record.extraction;

    let _ = write!(out, "=== Report: {} ===", record.key_id);
    if !record.order_id.is_empty() {
        let _ = write!(out, "  (order {})", record.order_id);
    }
    out.push_str("\n\n");

    if let Some(ref summary) = extraction.summary {
        let _ = writeln!(out, "  Summary: {summary}\n");
    }

    if extraction.findings.is_empty() {
        out.push_str("  No findings extracted.\n\n");
    } else {
        let _ = writeln!(
            out,
            "  Findings ({} abnormal of {}):",
            extraction.abnormal_count(),
            extraction.findings.len()
        );
        let max_organ = extraction
            .findings
            .iter()
            .map(|f| f.organ.chars().count())
            .max()
            .unwrap_or(5);

        for f in &extraction.findings {
            let status = if f.is_abnormal { "ABNORMAL" } else { "normal" };
            let presence = if f.present { "present" } else { "absent" };
            let _ = writeln!(
                out,
                "    {:<width$}  {:<8}  {:<7}  {}",
                f.organ,
                status,
                presence,
                f.label,
                width = max_organ
            );
            let _ = writeln!(out, "    {:<width$}  {}", "", f.description, width = max_organ);
            if let Some(ref details) = f.details {
                let _ = writeln!(out, "    {:<width$}  details: {}", "", details, width = max_organ);
            }
        }
        out.push('\n');
    }

    if let Some(ref impression) = extraction.impression {
        let _ = writeln!(out, "  Impression:\n    {}", impression.replace('\n', "\n    "));
    }

    out
}

/// Session overview: one block per record with its organ cells.
pub fn format_summary(records: &[SessionRecord]) -> String {
    let mut out = String::new();
    let organs = organ_columns(records);

    let _ = writeln!(
        out,
        "Session archive: {} report(s), {} organ column(s)\n",
        records.len(),
        organs.len()
    );
    if records.is_empty() {
        return out;
    }

    let max_key = records
        .iter()
        .map(|r| r.key_id.chars().count())
        .max()
        .unwrap_or(6)
        .max("Key ID".len());
    let max_organ = organs.iter().map(|o| o.chars().count()).max().unwrap_or(0);

    for record in records {
        let impression = record
            .extraction
            .impression
            .as_deref()
            .map(first_line)
            .unwrap_or("-");
        let _ = writeln!(out, "  {:<width$}  {}", record.key_id, impression, width = max_key);

        for organ in &organs {
            let cell = organ_cell(record, organ);
            if cell.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "  {:<kw$}    {:<ow$}  {}",
                "",
                organ,
                cell,
                kw = max_key,
                ow = max_organ
            );
        }
    }
    out.push('\n');

    out
}

/// Row-level diagnostics from a batch run.
pub fn format_batch_report(outcome: &BatchOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Processed {} row(s): {} accepted, {} failed, {} not a report, {} empty",
        outcome.total,
        outcome.records.len(),
        outcome.failures.len(),
        outcome.rejected.len(),
        outcome.skipped_empty.len()
    );

    for failure in &outcome.failures {
        let _ = writeln!(
            out,
            "  row {} ({}): {}",
            failure.index + 1,
            if failure.key_id.is_empty() { "no key" } else { failure.key_id.as_str() },
            failure.error
        );
    }

    out
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}
