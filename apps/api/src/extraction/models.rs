//! Values passed between pipeline stages and the final CV record.
//!
//! Each stage produces an owned value consumed by the next one; nothing here
//! is shared or mutated after construction.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::error::ExtractionError;

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

const MAX_EXTENSION_LEN: usize = 5;

/// An uploaded file as received from the caller.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub filename: String,
    pub mime_type: Option<String>,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>, mime_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            mime_type,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased extension of the filename, if any. Only a short
    /// alphanumeric suffix counts, so `CV - J. Smith` has none.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        let plausible = (1..=MAX_EXTENSION_LEN).contains(&ext.len())
            && ext.chars().all(|c| c.is_ascii_alphanumeric());
        if stem.is_empty() || !plausible {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// The format-specific extraction method chosen for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Pdf,
    Docx,
    Doc,
    Text,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Pdf => "pdf",
            Strategy::Docx => "docx",
            Strategy::Doc => "doc",
            Strategy::Text => "text",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_text_layer: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<String>,
    /// Decoder that produced the text, for plain-text uploads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    pub language: String,
    pub word_count: usize,
    pub character_count: usize,
}

/// Text recovered from a document by one format extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub text: String,
    pub strategy: Strategy,
    pub metadata: ExtractionMetadata,
}

// ────────────────────────────────────────────────────────────────────────────
// CV record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: Uuid,
    pub position: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: Uuid,
    pub degree: String,
    pub institution: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category: SkillCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: Uuid,
    pub name: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerWork {
    pub id: Uuid,
    pub role: String,
    pub organization: String,
    pub description: String,
}

/// Structured résumé produced by the pipeline. Empty lists are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub personal_info: PersonalInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<Experience>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<Education>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<Skill>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<Project>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<Achievement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volunteer_work: Vec<VolunteerWork>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hobbies: Vec<String>,
}

/// Field name → 0..=100 confidence. Ordered so serialized output is stable.
pub type FieldConfidenceMap = BTreeMap<String, u8>;

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCv {
    pub record: CvRecord,
    pub field_confidence: FieldConfidenceMap,
    /// Overall 0..=100 quality score.
    pub quality: u8,
    pub strategy: Strategy,
    pub metadata: ExtractionMetadata,
}

/// Deterministic identifier for a list entry: the same document always
/// yields the same ids.
pub fn entry_id(kind: &str, index: usize, key: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("cvparse:{kind}:{index}:{key}").as_bytes(),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub filename: String,
    pub file_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub strategy: Strategy,
    #[serde(flatten)]
    pub extraction: ExtractionMetadata,
    pub processing_time_ms: u64,
    pub processed_at: chrono::DateTime<chrono::Utc>,
}

/// JSON envelope returned to callers: `{success, data?, confidence?, metadata?, error?}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CvRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_confidence: Option<FieldConfidenceMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ParseResponse {
    pub fn success(parsed: ParsedCv, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            data: Some(parsed.record),
            confidence: Some(parsed.quality),
            field_confidence: Some(parsed.field_confidence),
            metadata: Some(metadata),
            error: None,
            error_code: None,
            details: None,
        }
    }

    pub fn failure(err: &ExtractionError) -> Self {
        Self {
            success: false,
            data: None,
            confidence: None,
            field_confidence: None,
            metadata: None,
            error: Some(err.user_message()),
            error_code: Some(err.code().to_string()),
            details: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lowercased() {
        let doc = RawDocument::new(vec![0u8; 12], "Resume.PDF", None);
        assert_eq!(doc.extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn test_extension_missing() {
        assert_eq!(RawDocument::new(vec![], "resume", None).extension(), None);
        assert_eq!(RawDocument::new(vec![], ".bashrc", None).extension(), None);
        assert_eq!(RawDocument::new(vec![], "CV - J. Smith", None).extension(), None);
        assert_eq!(RawDocument::new(vec![], "resume.final_v2", None).extension(), None);
    }

    #[test]
    fn test_entry_id_is_deterministic() {
        assert_eq!(entry_id("skill", 0, "Rust"), entry_id("skill", 0, "Rust"));
        assert_ne!(entry_id("skill", 0, "Rust"), entry_id("skill", 1, "Rust"));
    }

    #[test]
    fn test_empty_lists_omitted_from_json() {
        let record = CvRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("personalInfo").is_some());
        assert!(json.get("experience").is_none());
        assert!(json.get("volunteerWork").is_none());
    }

    #[test]
    fn test_failure_response_shape() {
        let err = ExtractionError::NoReadableText { chars: 2 };
        let json = serde_json::to_value(ParseResponse::failure(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorCode"], "NO_READABLE_TEXT");
        assert!(json.get("data").is_none());
        assert!(json["details"].as_str().unwrap().contains("2 characters"));
    }
}
