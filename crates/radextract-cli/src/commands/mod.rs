pub mod batch;
pub mod extract;
pub mod session;
pub mod template;

use radextract_core::config::{timeout_from_secs, ExtractorConfig};
use radextract_core::error::RadExtractError;
use radextract_core::extraction::gemini::GeminiExtractor;
use radextract_core::pipeline::BatchProgress;
use std::io::Write;

use crate::ServiceArgs;

/// Environment config with command-line overrides applied.
pub fn build_extractor(service: &ServiceArgs) -> Result<GeminiExtractor, RadExtractError> {
    let mut config = ExtractorConfig::from_env()?;
    if let Some(ref model) = service.model {
        config.model = model.clone();
    }
    if let Some(ref url) = service.base_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = service.timeout_secs {
        config.timeout = timeout_from_secs(secs);
    }

    tracing::info!(model = %config.model, base_url = %config.base_url, "extraction service configured");
    GeminiExtractor::new(config)
}

/// Single-line batch progress on stderr, ending the line after the last row.
pub fn print_progress(p: BatchProgress) {
    eprint!("\rExtracting report {}/{}", p.completed, p.total);
    if p.completed == p.total {
        eprintln!();
    }
    let _ = std::io::stderr().flush();
}
