use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prompt::{response_schema, user_prompt, SYSTEM_INSTRUCTION};
use super::response::parse_payload;
use super::ReportExtractor;
use crate::config::ExtractorConfig;
use crate::error::RadExtractError;
use crate::model::ExtractionResult;

/// Extraction backend calling the Gemini `generateContent` endpoint with a
/// JSON response schema.
pub struct GeminiExtractor {
    config: ExtractorConfig,
    client: reqwest::blocking::Client,
}

impl GeminiExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, RadExtractError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                RadExtractError::ServiceUnavailable(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn map_transport_error(&self, e: reqwest::Error) -> RadExtractError {
        if e.is_timeout() {
            let secs = self.config.timeout.map(|t| t.as_secs()).unwrap_or_default();
            RadExtractError::ServiceUnavailable(format!("request timed out after {secs}s"))
        } else if e.is_connect() {
            RadExtractError::ServiceUnavailable(format!(
                "could not connect to {}",
                self.config.base_url
            ))
        } else {
            RadExtractError::ServiceUnavailable(e.to_string())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn build_request(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        system_instruction: Content {
            parts: vec![Part {
                text: SYSTEM_INSTRUCTION,
            }],
        },
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    }
}

/// Concatenated text parts of the first candidate.
fn payload_text(response: GenerateResponse) -> Result<String, RadExtractError> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        RadExtractError::MalformedResponse("no candidates in response".into())
    })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(RadExtractError::MalformedResponse(format!(
            "no payload in response (finish reason: {reason})"
        )));
    }

    Ok(text)
}

impl ReportExtractor for GeminiExtractor {
    fn extract(&self, text: &str) -> Result<ExtractionResult, RadExtractError> {
        let url = self.endpoint();
        let prompt = user_prompt(text);
        let body = build_request(&prompt);

        tracing::debug!(model = %self.config.model, chars = text.len(), "sending extraction request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RadExtractError::ServiceUnavailable(format!(
                "service returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let envelope: GenerateResponse = response
            .json()
            .map_err(|e| RadExtractError::MalformedResponse(e.to_string()))?;

        let payload = payload_text(envelope)?;
        let result = parse_payload(&payload)?;

        tracing::debug!(findings = result.findings.len(), "extraction response parsed");
        Ok(result)
    }

    fn backend_name(&self) -> &str {
        "gemini"
    }
}
