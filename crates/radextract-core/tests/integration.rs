//! Integration tests for the CSV -> extraction -> session -> export pipeline.
//!
//! Uses a MockExtractor that returns canned results keyed on the report
//! text, so these tests never touch the network.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

use radextract_core::error::RadExtractError;
use radextract_core::export::{organ_columns, render};
use radextract_core::extraction::ReportExtractor;
use radextract_core::model::{ExtractionResult, Finding, RawRow};
use radextract_core::parsing::{parse_batch, read_records};
use radextract_core::pipeline::{run_batch, BatchProgress};
use radextract_core::process_csv;
use radextract_core::session::SessionStore;

struct MockExtractor {
    responses: HashMap<String, Result<ExtractionResult, String>>,
    calls: Mutex<Vec<String>>,
}

impl MockExtractor {
    fn new() -> Self {
        MockExtractor {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn ok(mut self, text: &str, result: ExtractionResult) -> Self {
        self.responses.insert(text.to_string(), Ok(result));
        self
    }

    fn fail(mut self, text: &str) -> Self {
        self.responses
            .insert(text.to_string(), Err("connection reset by peer".to_string()));
        self
    }
}

impl ReportExtractor for MockExtractor {
    fn extract(&self, text: &str) -> Result<ExtractionResult, RadExtractError> {
        self.calls.lock().unwrap().push(text.to_string());
        match self.responses.get(text) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(msg)) => Err(RadExtractError::ServiceUnavailable(msg.clone())),
            None => Err(RadExtractError::MalformedResponse("no payload".into())),
        }
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn finding(organ: &str, label: &str, description: &str, abnormal: bool) -> Finding {
    Finding {
        organ: organ.into(),
        label: label.into(),
        description: description.into(),
        present: true,
        is_abnormal: abnormal,
        details: None,
    }
}

fn result(impression: &str, findings: Vec<Finding>) -> ExtractionResult {
    ExtractionResult {
        is_valid_report: Some(true),
        summary: None,
        impression: Some(impression.into()),
        findings,
    }
}

// ---------------------------------------------------------------------------
// Test 1: Single chest x-ray row, normal lungs
// ---------------------------------------------------------------------------
#[test]
fn single_row_normal_lungs_end_to_end() {
    let text = "CHEST X-RAY: Clear lungs.";
    let extractor = MockExtractor::new().ok(
        text,
        result("Normal chest.", vec![finding("Lungs", "Clear", "Lungs are clear", false)]),
    );
    let csv = format!("PatientID,OrderID,Report_Text\nP-101,ORD-501,\"{text}\"\n");

    let outcome = process_csv(&csv, &extractor, None).unwrap();

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.key_id, "P-101");
    assert_eq!(record.order_id, "ORD-501");
    assert_eq!(record.raw_text, text);

    let exported = render(&outcome.records).unwrap();
    let rows = read_records(&exported);
    let lungs_col = rows[0].fields.iter().position(|f| f == "Lungs").unwrap();
    assert_eq!(rows[1].field(lungs_col), "[NORMAL] Clear: Lungs are clear");
}

// ---------------------------------------------------------------------------
// Test 2: Empty report text is skipped but still counts toward progress
// ---------------------------------------------------------------------------
#[test]
fn empty_report_text_skipped_with_progress() {
    let extractor = MockExtractor::new().ok("Liver normal.", result("ok", vec![]));
    let csv = "PatientID,OrderID,Report_Text\nP-1,ORD-1,\nP-2,ORD-2,Liver normal.\n";
    let updates = RefCell::new(Vec::new());
    let progress = |p: BatchProgress| updates.borrow_mut().push((p.completed, p.total));

    let outcome = process_csv(csv, &extractor, Some(&progress)).unwrap();

    assert_eq!(*updates.borrow(), vec![(1, 2), (2, 2)]);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].key_id, "P-2");
    assert_eq!(outcome.skipped_empty, vec![0]);
    // the empty row never reached the service
    assert_eq!(*extractor.calls.lock().unwrap(), vec!["Liver normal.".to_string()]);
}

// ---------------------------------------------------------------------------
// Test 3: Failed rows are isolated; survivors keep their relative order
// ---------------------------------------------------------------------------
#[test]
fn partial_failure_keeps_order() {
    let extractor = MockExtractor::new()
        .ok("r1", result("one", vec![]))
        .fail("r2")
        .ok("r3", result("three", vec![]))
        .fail("r4")
        .ok("r5", result("five", vec![]));
    let rows: Vec<RawRow> = (1..=5)
        .map(|i| RawRow::new(format!("P-{i}"), format!("O-{i}"), format!("r{i}")))
        .collect();

    let outcome = run_batch(&rows, &extractor, None);

    let keys: Vec<&str> = outcome.records.iter().map(|r| r.key_id.as_str()).collect();
    assert_eq!(keys, vec!["P-1", "P-3", "P-5"]);
    let failed: Vec<usize> = outcome.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 3]);
    assert_eq!(extractor.calls.lock().unwrap().len(), 5);
}

// ---------------------------------------------------------------------------
// Test 4: Malformed response is treated like any other row failure
// ---------------------------------------------------------------------------
#[test]
fn malformed_response_does_not_abort_batch() {
    let extractor = MockExtractor::new().ok("good", result("fine", vec![]));
    let rows = vec![RawRow::new("P-1", "O-1", "unknown"), RawRow::new("P-2", "O-2", "good")];

    let outcome = run_batch(&rows, &extractor, None);

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.failures[0].error.contains("malformed"));
}

// ---------------------------------------------------------------------------
// Test 5: Non-report text is silently dropped in batch mode
// ---------------------------------------------------------------------------
#[test]
fn non_report_dropped_in_batch() {
    let not_report = ExtractionResult {
        is_valid_report: Some(false),
        ..Default::default()
    };
    let no_flag = ExtractionResult {
        is_valid_report: None,
        impression: Some("kept".into()),
        ..Default::default()
    };
    let extractor = MockExtractor::new()
        .ok("shopping list", not_report)
        .ok("CT head: normal", no_flag);
    let rows = vec![
        RawRow::new("P-1", "O-1", "shopping list"),
        RawRow::new("P-2", "O-2", "CT head: normal"),
    ];

    let outcome = run_batch(&rows, &extractor, None);

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].key_id, "P-2");
    assert_eq!(outcome.rejected, vec![0]);
    assert!(outcome.failures.is_empty());
}

// ---------------------------------------------------------------------------
// Test 6: Upload-level guards prevent any extraction call
// ---------------------------------------------------------------------------
#[test]
fn oversized_batch_makes_no_calls() {
    let extractor = MockExtractor::new();
    let mut csv = String::from("PatientID,OrderID,Report_Text");
    for i in 0..501 {
        csv.push_str(&format!("\nP-{i},O-{i},text {i}"));
    }

    let err = process_csv(&csv, &extractor, None).unwrap_err();

    assert!(matches!(err, RadExtractError::TooManyRecords { count: 501, .. }));
    assert!(extractor.calls.lock().unwrap().is_empty());
}

#[test]
fn header_only_is_empty_batch() {
    let extractor = MockExtractor::new();
    let err = process_csv("PatientID,OrderID,Report_Text\n", &extractor, None).unwrap_err();
    assert!(matches!(err, RadExtractError::EmptyBatch));
}

// ---------------------------------------------------------------------------
// Test 7: Export header pivots distinct organs alphabetically
// ---------------------------------------------------------------------------
#[test]
fn export_header_alphabetical_organs() {
    let extractor = MockExtractor::new()
        .ok(
            "chest",
            result(
                "a",
                vec![
                    finding("Lungs", "Nodule", "5 mm", true),
                    finding("Heart", "Size", "normal", false),
                ],
            ),
        )
        .ok("abdomen", result("b", vec![finding("Liver", "Steatosis", "mild", true)]));
    let rows = vec![
        RawRow::new("P-1", "O-1", "chest"),
        RawRow::new("P-2", "O-2", "abdomen"),
    ];
    let mut store = SessionStore::new();
    store.append_many(run_batch(&rows, &extractor, None).records);

    let csv = render(store.records()).unwrap();

    assert_eq!(organ_columns(store.records()), vec!["Heart", "Liver", "Lungs"]);
    let header: Vec<String> = read_records(&csv)[0].fields.clone();
    assert_eq!(
        header.join(","),
        "Key ID,Timestamp,Raw Report,Impression,Heart,Liver,Lungs"
    );
}

// ---------------------------------------------------------------------------
// Test 8: Export reads back with identical Key ID and Impression
// ---------------------------------------------------------------------------
#[test]
fn export_round_trip_preserves_key_and_impression() {
    let tricky = [
        ("P-1", "Lungs clear, no effusion.", "Impression with \"quotes\", commas"),
        ("P,2", "Line one\nLine two", "Multi\nline impression"),
        ("P-3", "Plain", ""),
    ];
    let mut extractor = MockExtractor::new();
    for (_, text, impression) in &tricky {
        extractor = extractor.ok(text, result(impression, vec![finding("Bones", "Intact", "ok", false)]));
    }
    let rows: Vec<RawRow> = tricky
        .iter()
        .enumerate()
        .map(|(i, (key, text, _))| RawRow::new(*key, format!("O-{i}"), *text))
        .collect();

    let outcome = run_batch(&rows, &extractor, None);
    let mut store = SessionStore::new();
    store.append_many(outcome.records);

    let back = read_records(&render(store.records()).unwrap());
    assert_eq!(back.len(), tricky.len() + 1);
    for (record, (key, text, impression)) in back[1..].iter().zip(tricky.iter()) {
        assert_eq!(record.field(0), *key);
        assert_eq!(record.field(2), *text);
        assert_eq!(record.field(3), *impression);
    }
}

// ---------------------------------------------------------------------------
// Test 9: Parser returns exactly the data rows, in order
// ---------------------------------------------------------------------------
#[test]
fn parser_returns_rows_in_order() {
    let csv = "PatientID,OrderID,Report_Text\r\n\r\nA,1,x\r\nB,2,\"y, z\"\r\n\r\nC,3,w\r\n";
    let parsed = parse_batch(csv).unwrap();
    let keys: Vec<&str> = parsed.rows.iter().map(|r| r.key_id.as_str()).collect();
    assert_eq!(keys, vec!["A", "B", "C"]);
    assert_eq!(parsed.rows[1].report_text, "y, z");
}
