//! Strategy Selector: validates an upload and picks the extractor for it.
//!
//! The declared format (extension first, then mimetype) must agree with the
//! file's magic number. Undeclared formats are sniffed from the signature.

use crate::extraction::config::PipelineConfig;
use crate::extraction::error::ExtractionError;
use crate::extraction::formats::text::printable_ratio;
use crate::extraction::models::{RawDocument, Strategy};

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Returns the extraction strategy for `doc`, or the reason it cannot be processed.
pub fn select_strategy(doc: &RawDocument, config: &PipelineConfig) -> Result<Strategy, ExtractionError> {
    let size = doc.size();
    if size < config.min_file_bytes {
        return Err(ExtractionError::FileEmpty {
            size,
            min: config.min_file_bytes,
        });
    }
    if size > config.max_file_bytes {
        return Err(ExtractionError::FileTooLarge {
            size,
            max: config.max_file_bytes,
        });
    }

    let bytes = doc.bytes.as_ref();
    match declared_strategy(doc)? {
        Some(declared) => {
            verify_signature(declared, bytes)?;
            Ok(declared)
        }
        None => sniff(bytes),
    }
}

/// Format named by the extension or, failing that, the mimetype. An
/// unknown extension only rejects the upload when the mimetype names no
/// supported format either, so `Jane.Doe` sent as `application/pdf` is a PDF.
fn declared_strategy(doc: &RawDocument) -> Result<Option<Strategy>, ExtractionError> {
    let ext = doc.extension();
    let by_extension = ext.as_deref().and_then(|ext| match ext {
        "pdf" => Some(Strategy::Pdf),
        "docx" => Some(Strategy::Docx),
        "doc" => Some(Strategy::Doc),
        "txt" | "text" | "md" => Some(Strategy::Text),
        _ => None,
    });
    if by_extension.is_some() {
        return Ok(by_extension);
    }

    let mime = doc
        .mime_type
        .as_deref()
        .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase());
    let by_mime = match mime.as_deref() {
        Some("application/pdf") => Some(Strategy::Pdf),
        Some(DOCX_MIME) => Some(Strategy::Docx),
        Some("application/msword") => Some(Strategy::Doc),
        Some(m) if m.starts_with("text/") => Some(Strategy::Text),
        _ => None,
    };

    match (by_mime, ext) {
        (Some(strategy), _) => Ok(Some(strategy)),
        (None, Some(other)) => Err(ExtractionError::InvalidFormat(format!(
            "unsupported file extension '.{other}'"
        ))),
        (None, None) => Ok(None),
    }
}

fn verify_signature(declared: Strategy, bytes: &[u8]) -> Result<(), ExtractionError> {
    let ok = match declared {
        Strategy::Pdf => bytes.starts_with(PDF_MAGIC),
        Strategy::Docx => bytes.starts_with(ZIP_MAGIC),
        // Legacy .doc is not always OLE (RTF renamed to .doc is common), so only
        // reject signatures that belong to the other binary formats.
        Strategy::Doc | Strategy::Text => {
            !bytes.starts_with(PDF_MAGIC) && !bytes.starts_with(ZIP_MAGIC)
        }
    };
    if ok {
        Ok(())
    } else {
        Err(ExtractionError::InvalidFormat(format!(
            "file declared as {} does not carry a matching signature",
            declared.as_str()
        )))
    }
}

fn sniff(bytes: &[u8]) -> Result<Strategy, ExtractionError> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(Strategy::Pdf)
    } else if bytes.starts_with(ZIP_MAGIC) {
        Ok(Strategy::Docx)
    } else if bytes.starts_with(OLE_MAGIC) {
        Ok(Strategy::Doc)
    } else if printable_ratio(&String::from_utf8_lossy(bytes)) > 0.9 {
        Ok(Strategy::Text)
    } else {
        Err(ExtractionError::InvalidFormat(
            "unrecognised file signature".to_string(),
        ))
    }
}
