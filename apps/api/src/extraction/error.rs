//! Failure taxonomy for a single pipeline invocation.
//!
//! Every stage tags its own failures with a [`Stage`]; the pipeline surfaces
//! exactly one `ExtractionError` per failed run. Nothing here is retried:
//! format and content errors are not transient.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Strategy,
    Pdf,
    Docx,
    Doc,
    Text,
    Normalize,
    Segment,
    Fields,
    Score,
    Assemble,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Strategy => "strategy",
            Stage::Pdf => "pdf",
            Stage::Docx => "docx",
            Stage::Doc => "doc",
            Stage::Text => "text",
            Stage::Normalize => "normalize",
            Stage::Segment => "segment",
            Stage::Fields => "fields",
            Stage::Score => "score",
            Stage::Assemble => "assemble",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: usize, max: usize },

    #[error("File empty: {size} bytes is below the {min} byte minimum")]
    FileEmpty { size: usize, min: usize },

    #[error("No readable text: only {chars} characters recovered")]
    NoReadableText { chars: usize },

    #[error("Extraction failed at stage '{stage}': {detail}")]
    ExtractionFailure { stage: Stage, detail: String },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ExtractionError {
    pub fn failure(stage: Stage, detail: impl std::fmt::Display) -> Self {
        ExtractionError::ExtractionFailure {
            stage,
            detail: detail.to_string(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::InvalidFormat(_) => "INVALID_FORMAT",
            ExtractionError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ExtractionError::FileEmpty { .. } => "FILE_EMPTY",
            ExtractionError::NoReadableText { .. } => "NO_READABLE_TEXT",
            ExtractionError::ExtractionFailure { .. } => "EXTRACTION_FAILURE",
            ExtractionError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Short message safe to show an end user. Technical detail stays in `Display`.
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::InvalidFormat(_) => {
                "The file format is not supported or does not match its extension. Upload a PDF, DOCX, DOC or TXT file.".to_string()
            }
            ExtractionError::FileTooLarge { max, .. } => {
                format!("The file is too large. The maximum size is {} MB.", max / (1024 * 1024))
            }
            ExtractionError::FileEmpty { .. } => "The file is empty.".to_string(),
            ExtractionError::NoReadableText { .. } => {
                "No readable text was found. The document may be scanned or image-only.".to_string()
            }
            ExtractionError::ExtractionFailure { .. } => {
                "The document could not be processed. Try saving it in another format.".to_string()
            }
            ExtractionError::Unknown(_) => "An unexpected error occurred.".to_string(),
        }
    }

    /// True for errors caused by the uploaded content rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ExtractionError::ExtractionFailure { .. } | ExtractionError::Unknown(_)
        )
    }
}
