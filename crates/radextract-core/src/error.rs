#[derive(Debug, thiserror::Error)]
pub enum RadExtractError {
    #[error("batch has {count} rows, the limit is {limit}. Split the file and upload again")]
    TooManyRecords { count: usize, limit: usize },

    #[error("no usable rows found in batch (expected header line followed by PatientID,OrderID,Report_Text rows)")]
    EmptyBatch,

    #[error("extraction service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("extraction service returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("the text does not look like a radiology report. Revise the input and try again")]
    NotAMedicalReport,

    #[error("a Key ID (e.g. MRN or accession number) is required")]
    MissingKeyId,

    #[error("report text is empty")]
    EmptyReportText,

    #[error("no extraction under review to save")]
    NothingToSave,

    #[error("'{action}' is not available in the {view} view")]
    InvalidTransition { action: &'static str, view: String },

    #[error("no API key configured. Set GEMINI_API_KEY (or API_KEY)")]
    MissingApiKey,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RadExtractError {
    /// Whether a fresh user-initiated attempt with the same input may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RadExtractError::ServiceUnavailable(_) | RadExtractError::MalformedResponse(_)
        )
    }
}
