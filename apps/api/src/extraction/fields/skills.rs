//! Skills: delimiter-split tokens classified against the technical vocabulary.

use std::collections::HashSet;

use crate::extraction::models::{entry_id, Skill, SkillCategory};
use crate::extraction::patterns::{PatternTable, TECHNICAL_VOCABULARY};

use super::split_items;

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 49;
/// A `Label:` prefix longer than this is treated as content.
const MAX_LABEL_WORDS: usize = 4;

pub fn extract_skills(lines: &[&str], patterns: &PatternTable, cap: usize) -> Vec<Skill> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(|line| strip_label(patterns.strip_bullet(line)))
        .flat_map(split_items)
        .map(|token| token.trim_end_matches('.').trim())
        .filter(|token| (MIN_LEN..=MAX_LEN).contains(&token.chars().count()))
        .filter(|token| seen.insert(token.to_lowercase()))
        .take(cap)
        .enumerate()
        .map(|(index, name)| Skill {
            id: entry_id("skill", index, name),
            category: classify(name),
            name: name.to_string(),
        })
        .collect()
}

/// `Languages: Rust, Go` → `Rust, Go`.
fn strip_label(line: &str) -> &str {
    match line.split_once(':') {
        Some((label, rest)) if label.split_whitespace().count() <= MAX_LABEL_WORDS => rest.trim(),
        _ => line,
    }
}

pub fn classify(skill: &str) -> SkillCategory {
    let lower = skill.to_lowercase();
    let known = |term: &str| TECHNICAL_VOCABULARY.contains(&term);
    let technical = known(&lower)
        || lower
            .split(|c: char| c.is_whitespace() || c == '/' || c == '(' || c == ')')
            .filter(|word| word.chars().count() > 1)
            .any(known);
    if technical {
        SkillCategory::Technical
    } else {
        SkillCategory::Soft
    }
}
