//! Format extractors: raw bytes → text blob + extraction metadata.

pub mod docx;
pub mod pdf;
pub mod text;

use tracing::debug;

use crate::extraction::config::PipelineConfig;
use crate::extraction::error::ExtractionError;
use crate::extraction::language::detect_language;
use crate::extraction::models::{ExtractionMetadata, ExtractionResult, Strategy};
use crate::extraction::patterns::PatternTable;

/// Runs the extractor for `strategy` and fills in the shared metadata.
pub fn extract(
    bytes: &[u8],
    strategy: Strategy,
    config: &PipelineConfig,
    patterns: &PatternTable,
) -> Result<ExtractionResult, ExtractionError> {
    let mut metadata = ExtractionMetadata::default();
    let text = match strategy {
        Strategy::Pdf => {
            let pdf = pdf::extract_pdf(bytes, &config.pdf)?;
            metadata.page_count = Some(pdf.page_count);
            metadata.has_text_layer = Some(pdf.has_text_layer);
            metadata.fonts = pdf.fonts;
            pdf.text
        }
        Strategy::Docx => docx::extract_docx(bytes, patterns, config.max_docx_xml_bytes)?,
        Strategy::Doc => docx::extract_doc(bytes, patterns)?,
        Strategy::Text => {
            let decoded = text::extract_text(bytes, &config.text);
            metadata.encoding = decoded.encoding.map(|e| e.label().to_string());
            decoded.text
        }
    };

    metadata.language = detect_language(&text);
    metadata.word_count = text.split_whitespace().count();
    metadata.character_count = text.chars().count();
    debug!(
        strategy = strategy.as_str(),
        words = metadata.word_count,
        language = %metadata.language,
        "text extracted"
    );

    Ok(ExtractionResult {
        text,
        strategy,
        metadata,
    })
}
