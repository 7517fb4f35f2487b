//! Education records: one per degree line, with institution, field, years
//! and GPA looked up in the neighbouring lines.

use crate::extraction::models::{entry_id, Education};
use crate::extraction::patterns::PatternTable;

/// Lines searched on either side of a degree line.
const WINDOW: usize = 2;

pub fn extract_education(lines: &[&str], patterns: &PatternTable, cap: usize) -> Vec<Education> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| patterns.degree.is_match(line))
        .take(cap)
        .enumerate()
        .map(|(index, (at, line))| {
            // Neighbours nearest-first; other degree lines belong to their own record.
            let neighbours: Vec<&str> = nearest_first(at, lines.len())
                .filter(|&j| j == at || !patterns.degree.is_match(lines[j]))
                .map(|j| lines[j])
                .collect();

            let degree = segment_matching(line, &patterns.degree)
                .map(|s| strip_years(&s, patterns))
                .unwrap_or_else(|| line.to_string());
            let institution = neighbours
                .iter()
                .find_map(|l| segment_matching(l, &patterns.institution))
                .map(|s| strip_years(&s, patterns))
                .unwrap_or_default();
            let field = patterns
                .field_of_study
                .captures_iter(&degree)
                .last()
                .map(|c| c[1].trim().to_string())
                .unwrap_or_default();
            let (start_date, end_date) = years(&neighbours, patterns);
            let gpa = neighbours
                .iter()
                .find_map(|l| patterns.gpa.captures(l))
                .map(|c| c[1].to_string());

            Education {
                id: entry_id("education", index, &degree),
                degree,
                institution,
                field,
                start_date,
                end_date,
                gpa,
            }
        })
        .collect()
}

/// `at`, then `at+1`, `at-1`, `at+2`, `at-2`, within bounds.
fn nearest_first(at: usize, len: usize) -> impl Iterator<Item = usize> {
    std::iter::once(at).chain((1..=WINDOW).flat_map(move |d| {
        [at.checked_add(d).filter(|&j| j < len), at.checked_sub(d)]
            .into_iter()
            .flatten()
    }))
}

/// The comma-, pipe- or dash-separated part of `line` that `keyword` matches.
fn segment_matching(line: &str, keyword: &regex::Regex) -> Option<String> {
    line.split([',', '|'])
        .flat_map(|part| part.split(" - "))
        .map(str::trim)
        .find(|part| keyword.is_match(part))
        .map(str::to_string)
}

fn strip_years(text: &str, patterns: &PatternTable) -> String {
    let text = patterns.year_range.replace_all(text, "");
    let text = patterns.gpa.replace_all(&text, "");
    text.trim()
        .trim_end_matches(['(', ')', ',', '-'])
        .trim()
        .to_string()
}

/// A `YYYY - YYYY` range if one is nearby, else the spread of single years.
fn years(neighbours: &[&str], patterns: &PatternTable) -> (String, String) {
    if let Some(c) = neighbours.iter().find_map(|l| patterns.year_range.captures(l)) {
        return (c[1].to_string(), c[2].to_string());
    }
    let mut found: Vec<&str> = neighbours
        .iter()
        .flat_map(|l| patterns.year.find_iter(l).map(|m| m.as_str()))
        .collect();
    found.sort_unstable();
    found.dedup();
    match found.as_slice() {
        [] => (String::new(), String::new()),
        [only] => (String::new(), only.to_string()),
        [first, .., last] => (first.to_string(), last.to_string()),
    }
}
