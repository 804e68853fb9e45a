use csv::{ReaderBuilder, StringRecord, Trim};

/// One logical CSV record and the line it started on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line_number: usize,
    pub fields: Vec<String>,
}

impl CsvRecord {
    /// True when every field is empty (e.g. a line of bare commas).
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.is_empty())
    }

    pub fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }

    fn from_string_record(record: &StringRecord) -> Self {
        CsvRecord {
            line_number: record.position().map(|p| p.line() as usize).unwrap_or(0),
            fields: record.iter().map(str::to_string).collect(),
        }
    }

    /// A line holding nothing but whitespace.
    fn is_blank_line(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].is_empty()
    }
}

/// Tolerant CSV reader.
///
/// Fields are comma-separated; a field may be wrapped in double quotes, in
/// which case commas, newlines and doubled quotes (`""`) inside it are data.
/// Every field is trimmed and rows may have any number of fields. Blank
/// lines are dropped, a leading UTF-8 BOM is ignored and an unterminated
/// quote runs to the end of input instead of failing.
pub fn read_records(text: &str) -> Vec<CsvRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => CsvRecord::from_string_record(&record),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable CSV record, skipping");
                continue;
            }
        };
        if !record.is_blank_line() {
            records.push(record);
        }
    }
    records
}
