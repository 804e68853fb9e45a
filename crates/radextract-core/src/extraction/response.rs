use crate::error::RadExtractError;
use crate::model::ExtractionResult;

/// Parse and validate the JSON payload returned by the extraction service.
///
/// The payload must deserialize into [`ExtractionResult`]; beyond what serde
/// enforces, every finding needs a non-blank organ and label. Organ names are
/// trimmed so they group cleanly into export columns.
pub fn parse_payload(payload: &str) -> Result<ExtractionResult, RadExtractError> {
    if payload.trim().is_empty() {
        return Err(RadExtractError::MalformedResponse(
            "no payload in response".into(),
        ));
    }

    let block = json_block(payload)?;
    let mut result: ExtractionResult = serde_json::from_str(block)
        .map_err(|e| RadExtractError::MalformedResponse(e.to_string()))?;

    for (i, finding) in result.findings.iter_mut().enumerate() {
        let organ = finding.organ.trim();
        if organ.is_empty() {
            return Err(RadExtractError::MalformedResponse(format!(
                "finding {i} has an empty organ"
            )));
        }
        if finding.label.trim().is_empty() {
            return Err(RadExtractError::MalformedResponse(format!(
                "finding {i} ({organ}) has an empty label"
            )));
        }
        finding.organ = organ.to_string();
    }

    Ok(result)
}

/// Locate the JSON object in a payload that may carry markdown fences or
/// surrounding prose.
fn json_block(payload: &str) -> Result<&str, RadExtractError> {
    let trimmed = payload.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let after_fence = after_fence.strip_prefix("json").unwrap_or(after_fence);
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            if block.starts_with('{') {
                return Ok(block);
            }
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(RadExtractError::MalformedResponse(
            "no JSON object found in response".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "is_medical_report": true,
        "impression": "No acute disease.",
        "findings": [
            {"organ": " Lungs ", "finding_label": "Clear", "finding_description": "Lungs are clear",
             "present": true, "is_abnormal": false}
        ]
    }"#;

    #[test]
    fn test_valid_payload() {
        let result = parse_payload(VALID).unwrap();
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].organ, "Lungs");
        assert_eq!(result.impression.as_deref(), Some("No acute disease."));
    }

    #[test]
    fn test_fenced_payload() {
        let fenced = format!("Here you go:\n```json\n{VALID}\n```\n");
        assert!(parse_payload(&fenced).is_ok());
    }

    #[test]
    fn test_empty_payload() {
        assert!(matches!(
            parse_payload("  \n"),
            Err(RadExtractError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_findings_rejected() {
        assert!(matches!(
            parse_payload(r#"{"impression": "x"}"#),
            Err(RadExtractError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let bad = r#"{"findings": [{"organ": "Lungs", "finding_label": "X",
            "finding_description": "Y", "present": "yes", "is_abnormal": false}]}"#;
        assert!(matches!(
            parse_payload(bad),
            Err(RadExtractError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_blank_organ_rejected() {
        let bad = r#"{"findings": [{"organ": "  ", "finding_label": "X",
            "finding_description": "Y", "present": true, "is_abnormal": false}]}"#;
        let err = parse_payload(bad).unwrap_err();
        assert!(err.to_string().contains("empty organ"));
    }

    #[test]
    fn test_prose_without_json() {
        assert!(matches!(
            parse_payload("I cannot help with that."),
            Err(RadExtractError::MalformedResponse(_))
        ));
    }
}
