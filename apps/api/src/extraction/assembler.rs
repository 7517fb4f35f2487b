//! Result Assembler: final validation and packaging of a parsed CV.

use crate::extraction::models::{CvRecord, ExtractionResult, ParsedCv};
use crate::extraction::patterns::PatternTable;
use crate::extraction::personal::is_valid_email;
use crate::extraction::scoring::Scores;

pub fn assemble(
    record: CvRecord,
    scores: Scores,
    extraction: ExtractionResult,
    patterns: &PatternTable,
) -> ParsedCv {
    ParsedCv {
        record: finalize(record, patterns),
        field_confidence: scores.field_confidence,
        quality: scores.quality,
        strategy: extraction.strategy,
        metadata: extraction.metadata,
    }
}

fn finalize(mut record: CvRecord, patterns: &PatternTable) -> CvRecord {
    let pi = &mut record.personal_info;
    pi.full_name = title_case(pi.full_name.trim());
    if !pi.email.is_empty() && !is_valid_email(&pi.email, patterns) {
        pi.email.clear();
    }

    record
        .experience
        .retain(|e| !(e.position.trim().is_empty() && e.company.trim().is_empty()));
    record.education.retain(|e| !e.degree.trim().is_empty());
    record.skills.retain(|s| !s.name.trim().is_empty());
    record.projects.retain(|p| !p.name.trim().is_empty());
    record.certifications.retain(|c| !c.trim().is_empty());
    record.languages.retain(|l| !l.name.trim().is_empty());
    record.achievements.retain(|a| !a.title.trim().is_empty());
    record.volunteer_work.retain(|v| !v.role.trim().is_empty());
    record.hobbies.retain(|h| !h.trim().is_empty());
    record
}

/// `JANE o'neil-smith` → `Jane O'Neil-Smith`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = c.is_whitespace() || c == '-' || c == '\'';
    }
    out
}
