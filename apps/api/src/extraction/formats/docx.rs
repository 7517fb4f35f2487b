//! Word document extractors.
//!
//! Both are approximations rather than full parsers. DOCX text is pulled
//! from `<w:t>` runs of `word/document.xml` by pattern matching; legacy DOC
//! keeps the printable bytes of the binary and discards the rest.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::extraction::error::{ExtractionError, Stage};
use crate::extraction::patterns::PatternTable;

const DOCUMENT_PART: &str = "word/document.xml";

/// `max_xml_bytes` bounds the decompressed `word/document.xml`; larger parts
/// fail the DOCX stage instead of being inflated into memory.
pub fn extract_docx(
    bytes: &[u8],
    patterns: &PatternTable,
    max_xml_bytes: usize,
) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::failure(Stage::Docx, e))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::failure(Stage::Docx, format!("{DOCUMENT_PART}: {e}")))?;

    let too_large = || {
        ExtractionError::failure(
            Stage::Docx,
            format!("{DOCUMENT_PART} exceeds {max_xml_bytes} bytes"),
        )
    };
    if part.size() > max_xml_bytes as u64 {
        return Err(too_large());
    }

    // The declared size can lie, so the read itself is bounded too.
    let mut xml = String::new();
    part.take(max_xml_bytes as u64 + 1)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::failure(Stage::Docx, e))?;
    if xml.len() > max_xml_bytes {
        return Err(too_large());
    }

    Ok(document_xml_text(&xml, patterns))
}

/// One output line per paragraph; runs inside a paragraph are joined with spaces.
fn document_xml_text(xml: &str, patterns: &PatternTable) -> String {
    patterns
        .docx_paragraph
        .find_iter(xml)
        .map(|paragraph| {
            let runs: Vec<String> = patterns
                .docx_run_text
                .captures_iter(paragraph.as_str())
                .map(|cap| unescape(&cap[1]))
                .collect();
            collapse(&runs.join(" "), patterns)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape(raw: &str) -> String {
    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Legacy binary `.doc`: keep printable characters, turn Word's `\r`
/// paragraph marks into newlines, drop everything else.
pub fn extract_doc(bytes: &[u8], patterns: &PatternTable) -> Result<String, ExtractionError> {
    let decoded = String::from_utf8_lossy(bytes);
    let printable: String = decoded
        .chars()
        .map(|c| match c {
            '\r' | '\n' => '\n',
            '\t' => ' ',
            c if c.is_control() || c == char::REPLACEMENT_CHARACTER => ' ',
            c => c,
        })
        .collect();

    Ok(printable
        .lines()
        .map(|line| collapse(line, patterns))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn collapse(line: &str, patterns: &PatternTable) -> String {
    patterns.horizontal_ws.replace_all(line, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::patterns::test_patterns;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0"?>
<w:document><w:body>
<w:p><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve">Doe</w:t></w:r></w:p>
<w:p><w:pPr/><w:r><w:t>R&amp;D   Engineer</w:t></w:r></w:p>
</w:body></w:document>"#;

    fn docx_bytes(xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_document_xml_runs_and_paragraphs() {
        assert_eq!(document_xml_text(DOCUMENT_XML, test_patterns()), "Jane Doe\nR&D Engineer");
    }

    #[test]
    fn test_extract_docx_archive() {
        let text = extract_docx(&docx_bytes(DOCUMENT_XML), test_patterns(), 1024 * 1024).unwrap();
        assert_eq!(text, "Jane Doe\nR&D Engineer");
    }

    #[test]
    fn test_oversized_document_part_fails_docx_stage() {
        let padding = " ".repeat(64 * 1024);
        let xml = format!("<w:document><w:body>{padding}</w:body></w:document>");
        let bytes = docx_bytes(&xml);
        assert!(bytes.len() < xml.len());

        let err = extract_docx(&bytes, test_patterns(), 4096).unwrap_err();
        match err {
            ExtractionError::ExtractionFailure { stage, detail } => {
                assert_eq!(stage, Stage::Docx);
                assert!(detail.contains("exceeds 4096 bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_docx_without_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_docx(&bytes, test_patterns(), 1024 * 1024).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::ExtractionFailure { stage: Stage::Docx, .. }
        ));
    }

    #[test]
    fn test_doc_strips_binary_noise() {
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0x00, 0x01];
        bytes.extend_from_slice(b"Jane Doe\r\x00\x02Senior   Engineer\r\x07");
        let text = extract_doc(&bytes, test_patterns()).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Senior Engineer"));
        assert!(!text.contains('\u{0}'));
    }
}
