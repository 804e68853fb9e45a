use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// One data row of an uploaded batch: `PatientID,OrderID,Report_Text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub key_id: String,
    pub order_id: String,
    pub report_text: String,
}

impl RawRow {
    pub fn new(
        key_id: impl Into<String>,
        order_id: impl Into<String>,
        report_text: impl Into<String>,
    ) -> Self {
        RawRow {
            key_id: key_id.into(),
            order_id: order_id.into(),
            report_text: report_text.into(),
        }
    }
}

/// One organ-level observation.
///
/// `present == false` means the report explicitly negates the finding
/// ("No pleural effusion"), not that it was left out. A normal anatomical
/// state ("Heart size is normal") is `present == true, is_abnormal == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub organ: String,
    #[serde(rename = "finding_label")]
    pub label: String,
    #[serde(rename = "finding_description")]
    pub description: String,
    pub present: bool,
    pub is_abnormal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Finding {
    pub fn status_tag(&self) -> &'static str {
        if self.is_abnormal {
            "[ABNORMAL]"
        } else {
            "[NORMAL]"
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status_tag(), self.label, self.description)
    }
}

/// Structured result of one extraction call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(
        rename = "is_medical_report",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_valid_report: Option<bool>,
    #[serde(
        rename = "patient_summary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impression: Option<String>,
    pub findings: Vec<Finding>,
}

impl ExtractionResult {
    /// True only when the service explicitly classified the text as not a
    /// radiology report. An absent flag counts as valid.
    pub fn is_rejected(&self) -> bool {
        self.is_valid_report == Some(false)
    }

    /// Distinct organ names referenced by this result, sorted.
    pub fn organs(&self) -> BTreeSet<&str> {
        self.findings.iter().map(|f| f.organ.as_str()).collect()
    }

    pub fn findings_for<'a>(&'a self, organ: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.organ == organ)
    }

    pub fn abnormal_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_abnormal).count()
    }
}

/// An accepted extraction, owned by the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub key_id: String,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub raw_text: String,
    pub extraction: ExtractionResult,
}

impl SessionRecord {
    /// Build a record with a fresh id, stamped now.
    pub fn new(
        key_id: impl Into<String>,
        order_id: impl Into<String>,
        raw_text: impl Into<String>,
        extraction: ExtractionResult,
    ) -> Self {
        SessionRecord {
            id: Uuid::new_v4(),
            key_id: key_id.into(),
            order_id: order_id.into(),
            created_at: Utc::now(),
            raw_text: raw_text.into(),
            extraction,
        }
    }
}
