use serde_json::{json, Value};

/// Fixed instruction sent with every report.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a world-class radiology information extraction assistant.
Your task is to parse complex, unstructured free-text radiology reports and extract structured data.

CRITICAL RULES:
0. VALIDITY: First decide whether the text is a genuine radiology report. If it is not,
   set 'is_medical_report' to FALSE and return an empty 'findings' array.
1. NEGATION AWARENESS: Distinguish between presence and absence.
   - If the report says \"No pleural effusion,\" then 'present' is FALSE and 'is_abnormal' is FALSE.
   - If the report says \"Pleural effusion is identified,\" then 'present' is TRUE and 'is_abnormal' is TRUE.
   - \"Normal heart size\" means 'present' is TRUE (the heart is there), but 'is_abnormal' is FALSE.
2. ORGAN-BY-ORGAN: Group findings by specific organs (e.g., Lungs, Heart, Liver, Gallbladder, Spleen, Bones, Vessels).
3. FINDING LABEL: Use concise labels like \"Consolidation\", \"Mass\", \"Nodule\", \"Ascites\", \"Atherosclerosis\".
4. ACCURACY: Read line by line. Do not hallucinate findings that aren't there.
5. ABNORMALITY: Any finding that indicates pathology, disease, or deviation from expected healthy state should be marked 'is_abnormal: true'.
";

/// User turn wrapping the report text.
pub fn user_prompt(report_text: &str) -> String {
    format!("Extract data from this radiology report:\n\n{report_text}")
}

/// Response schema in the service's OpenAPI subset.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_medical_report": {
                "type": "BOOLEAN",
                "description": "True if the text is a genuine radiology report, false otherwise."
            },
            "patient_summary": {
                "type": "STRING",
                "description": "A very brief clinical summary of the patient's state based on the report."
            },
            "impression": {
                "type": "STRING",
                "description": "The final diagnosis or conclusion from the report."
            },
            "findings": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "organ": { "type": "STRING", "description": "The organ or anatomical region." },
                        "finding_label": { "type": "STRING", "description": "Common medical name for the finding." },
                        "finding_description": { "type": "STRING", "description": "The literal text or summarized finding from the report." },
                        "present": { "type": "BOOLEAN", "description": "True if the finding (e.g. mass, fluid) exists. False if it is explicitly negated." },
                        "is_abnormal": { "type": "BOOLEAN", "description": "True if this is an abnormal medical finding." },
                        "details": { "type": "STRING", "description": "Extra context like location, size, or severity." }
                    },
                    "required": ["organ", "finding_label", "finding_description", "present", "is_abnormal"]
                }
            }
        },
        "required": ["is_medical_report", "findings"]
    })
}
