//! Section Segmenter: splits normalized text into labeled sections.
//!
//! A pure fold over lines: a header line closes the open section and opens
//! the matched one; other lines accumulate under the open section. Lines
//! before the first header form the preamble. The front-matter window is the
//! first `front_matter_lines` non-empty lines of the whole document and is
//! consumed only by personal-info extraction.

use serde::Serialize;

use crate::extraction::patterns::{PatternTable, SectionLabel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub label: SectionLabel,
    /// The header line as it appeared in the document.
    pub header: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    pub front_matter: Vec<String>,
    pub preamble: Vec<String>,
    pub sections: Vec<Section>,
}

impl Segmentation {
    /// Lines of every section with `label`, in document order.
    pub fn lines_for(&self, label: SectionLabel) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| s.label == label)
            .flat_map(|s| s.lines.iter().map(String::as_str))
            .collect()
    }

    pub fn labels(&self) -> Vec<SectionLabel> {
        self.sections.iter().map(|s| s.label).collect()
    }
}

pub fn segment(text: &str, patterns: &PatternTable, front_matter_lines: usize) -> Segmentation {
    let non_empty = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let front_matter = non_empty
        .clone()
        .take(front_matter_lines)
        .map(String::from)
        .collect();

    let (preamble, sections) = non_empty.fold(
        (Vec::new(), Vec::<Section>::new()),
        |(mut preamble, mut sections), line| {
            match patterns.section_for(line) {
                Some(label) => sections.push(Section {
                    label,
                    header: line.to_string(),
                    lines: Vec::new(),
                }),
                None => match sections.last_mut() {
                    Some(open) => open.lines.push(line.to_string()),
                    None => preamble.push(line.to_string()),
                },
            }
            (preamble, sections)
        },
    );

    Segmentation {
        front_matter,
        preamble,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::patterns::test_patterns;

    const SAMPLE: &str = "Jane Doe\njane@mail.com\n\nEXPERIENCE\nEngineer at Acme\nJan 2020 - Present\n\nEducation\nBSc Physics\nSKILLS\nRust, Go";

    #[test]
    fn test_sections_in_order() {
        let seg = segment(SAMPLE, test_patterns(), 20);
        assert_eq!(
            seg.labels(),
            vec![SectionLabel::Experience, SectionLabel::Education, SectionLabel::Skills]
        );
        assert_eq!(seg.preamble, vec!["Jane Doe", "jane@mail.com"]);
        assert_eq!(seg.lines_for(SectionLabel::Experience), vec!["Engineer at Acme", "Jan 2020 - Present"]);
        assert_eq!(seg.lines_for(SectionLabel::Skills), vec!["Rust, Go"]);
    }

    #[test]
    fn test_front_matter_window_is_capped() {
        let seg = segment(SAMPLE, test_patterns(), 3);
        assert_eq!(seg.front_matter, vec!["Jane Doe", "jane@mail.com", "EXPERIENCE"]);
    }

    #[test]
    fn test_no_headers_keeps_everything_in_preamble() {
        let seg = segment("Jane Doe\nSome text\nMore text", test_patterns(), 20);
        assert!(seg.sections.is_empty());
        assert_eq!(seg.preamble.len(), 3);
    }

    #[test]
    fn test_repeated_label_concatenates() {
        let text = "Experience\nA at B\nSkills\nRust\nExperience\nC at D";
        let seg = segment(text, test_patterns(), 20);
        assert_eq!(seg.sections.len(), 3);
        assert_eq!(seg.lines_for(SectionLabel::Experience), vec!["A at B", "C at D"]);
    }

    #[test]
    fn test_every_line_after_first_header_has_one_section() {
        let seg = segment(SAMPLE, test_patterns(), 20);
        let non_empty: Vec<&str> = SAMPLE.lines().filter(|l| !l.trim().is_empty()).collect();
        let first_header = non_empty
            .iter()
            .position(|l| test_patterns().section_for(l).is_some())
            .unwrap();
        let after = non_empty.len() - first_header;
        let covered: usize = seg.sections.iter().map(|s| 1 + s.lines.len()).sum();
        assert_eq!(covered, after);
    }
}
