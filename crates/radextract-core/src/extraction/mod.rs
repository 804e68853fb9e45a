pub mod gemini;
pub mod prompt;
pub mod response;

use crate::error::RadExtractError;
use crate::model::ExtractionResult;

/// Trait for structured-extraction backends.
///
/// One call per report; implementations do not retry. Transport failures
/// map to `ServiceUnavailable`, unusable payloads to `MalformedResponse`.
pub trait ReportExtractor: Send + Sync {
    /// Extract organ-grouped findings from raw report text.
    fn extract(&self, text: &str) -> Result<ExtractionResult, RadExtractError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
