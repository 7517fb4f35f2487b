//! Text Normalizer: removes encoding and OCR noise before segmentation.

use crate::extraction::patterns::PatternTable;

/// Deterministic cleanup of extracted text.
///
/// Order matters: typography is folded first so later patterns only see
/// ASCII quotes and hyphens; artifact lines are dropped before OCR fixes so
/// page numbers are never "corrected" into letters.
pub fn normalize(text: &str, patterns: &PatternTable) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = fold_typography(&text);

    let lines: Vec<String> = text
        .lines()
        .map(|line| patterns.horizontal_ws.replace_all(line, " ").trim().to_string())
        .filter(|line| line.is_empty() || keep_line(line, patterns))
        .collect();
    let mut text = lines.join("\n");

    for (regex, replacement) in &patterns.ocr {
        text = regex.replace_all(&text, *replacement).into_owned();
    }

    patterns
        .blank_run
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

fn fold_typography(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
            | '\u{2212}' => '-',
            c => c,
        })
        .collect()
}

/// Drops page numbers, separator rules and fragments too short to mean anything.
fn keep_line(line: &str, patterns: &PatternTable) -> bool {
    if patterns.page_artifacts.iter().any(|re| re.is_match(line)) {
        return false;
    }
    let visible = line.chars().filter(|c| !c.is_whitespace()).count();
    visible >= 3 || patterns.short_meaningful.is_match(line)
}
