//! Plain-text extractor: tries a fixed list of encodings and keeps the first
//! decoding that looks like real text.

use crate::extraction::config::TextDecodeConfig;

/// Encodings in the order they are attempted.
const ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Utf8,
    TextEncoding::Utf16,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_owned)
            }
            TextEncoding::Utf16 => decode_utf16(bytes),
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Windows1252 => Some(bytes.iter().map(|&b| windows_1252_char(b)).collect()),
        }
    }
}

/// Text recovered from a plain-text upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    /// `None` when every decoder was rejected and raw lossy decoding was used.
    pub encoding: Option<TextEncoding>,
}

pub fn extract_text(bytes: &[u8], config: &TextDecodeConfig) -> DecodedText {
    for encoding in ENCODINGS {
        let Some(text) = encoding.decode(bytes) else {
            continue;
        };
        let printable = printable_len(&text);
        if printable_ratio(&text) > config.min_printable_ratio && printable > config.min_printable_len {
            tracing::debug!(encoding = encoding.label(), printable, "text decoding accepted");
            return DecodedText {
                text,
                encoding: Some(*encoding),
            };
        }
    }

    tracing::warn!("no encoding passed the printable check, using lossy decoding");
    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: None,
    }
}

fn is_printable(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\t') || !(c.is_control() || c == char::REPLACEMENT_CHARACTER)
}

fn printable_len(text: &str) -> usize {
    text.chars().filter(|&c| is_printable(c)).count()
}

/// Share of characters that are printable (whitespace controls count as printable).
pub fn printable_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    printable_len(text) as f64 / total as f64
}

/// Share of NUL bytes in one byte lane above which BOM-less input is read as UTF-16.
const UTF16_NUL_SHARE: f64 = 0.3;

/// Share of NUL bytes at even and at odd offsets.
fn nul_shares(bytes: &[u8]) -> (f64, f64) {
    let lane = |offset: usize| {
        let lane: Vec<u8> = bytes.iter().skip(offset).step_by(2).copied().collect();
        if lane.is_empty() {
            return 0.0;
        }
        lane.iter().filter(|&&b| b == 0).count() as f64 / lane.len() as f64
    };
    (lane(0), lane(1))
}

/// UTF-16 is only attempted with a BOM or when one byte lane is mostly NUL,
/// which is how Latin text looks in UTF-16. Anything else is single-byte text.
fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        _ => {
            let (even, odd) = nul_shares(bytes);
            if odd >= UTF16_NUL_SHARE && odd >= even {
                (bytes, false)
            } else if even >= UTF16_NUL_SHARE {
                (bytes, true)
            } else {
                return None;
            }
        }
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}

/// Windows-1252 differs from Latin-1 only in 0x80..=0x9F.
fn windows_1252_char(b: u8) -> char {
    const HIGH: [char; 32] = [
        '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8D}', 'Ž', '\u{8F}',
        '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{9D}', 'ž', 'Ÿ',
    ];
    match b {
        0x80..=0x9F => HIGH[(b - 0x80) as usize],
        _ => b as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_first() {
        let decoded = extract_text("Jürgen Müller — Ingenieur".as_bytes(), &TextDecodeConfig::default());
        assert_eq!(decoded.encoding, Some(TextEncoding::Utf8));
        assert!(decoded.text.contains("Müller"));
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Software Engineer at Acme".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = extract_text(&bytes, &TextDecodeConfig::default());
        assert_eq!(decoded.encoding, Some(TextEncoding::Utf16));
        assert_eq!(decoded.text, "Software Engineer at Acme");
    }

    #[test]
    fn test_latin1_fallback() {
        // ISO-8859-1 bytes: invalid UTF-8 and no NUL lanes.
        let bytes = b"caf\xe9 r\xe9sum\xe9 texts";
        let decoded = extract_text(bytes, &TextDecodeConfig::default());
        assert_eq!(decoded.encoding, Some(TextEncoding::Latin1));
        assert_eq!(decoded.text, "café résumé texts");
    }

    #[test]
    fn test_even_length_latin1_is_not_utf16() {
        let bytes = b"Jos\xe9 Garc\xeda\nIngeniero de software en Madrid, caf\xe9!";
        assert_eq!(bytes.len() % 2, 0);
        let decoded = extract_text(bytes, &TextDecodeConfig::default());
        assert_eq!(decoded.encoding, Some(TextEncoding::Latin1));
        assert_eq!(decoded.text, "José García\nIngeniero de software en Madrid, café!");
    }

    #[test]
    fn test_utf16_without_bom_detected_from_nul_lanes() {
        let text = "Data Engineer, Berlin";
        let le: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let decoded = extract_text(&le, &TextDecodeConfig::default());
        assert_eq!(decoded.encoding, Some(TextEncoding::Utf16));
        assert_eq!(decoded.text, text);

        let be: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        let decoded = extract_text(&be, &TextDecodeConfig::default());
        assert_eq!(decoded.encoding, Some(TextEncoding::Utf16));
        assert_eq!(decoded.text, text);
    }

    #[test]
    fn test_short_input_falls_back_to_lossy() {
        let decoded = extract_text(b"ok", &TextDecodeConfig::default());
        assert_eq!(decoded.encoding, None);
        assert_eq!(decoded.text, "ok");
    }

    #[test]
    fn test_windows_1252_quotes() {
        assert_eq!(windows_1252_char(0x93), '“');
        assert_eq!(windows_1252_char(0x41), 'A');
    }

    #[test]
    fn test_printable_ratio() {
        assert_eq!(printable_ratio(""), 0.0);
        assert_eq!(printable_ratio("abc\n"), 1.0);
        assert!(printable_ratio("a\u{1}\u{2}\u{3}") < 0.5);
    }
}
