//! Trigger-driven list extractors: projects, certifications, languages,
//! achievements, volunteer work and hobbies.

use std::collections::HashSet;

use crate::extraction::models::{entry_id, Achievement, Language, Project, VolunteerWork};
use crate::extraction::patterns::{
    PatternTable, TriggerKind, HOBBY_KEYWORDS, KNOWN_LANGUAGES, PROFICIENCY_MARKERS,
    TECHNICAL_VOCABULARY,
};

use super::experience::split_title;
use super::split_items;

const DEFAULT_PROFICIENCY: &str = "Intermediate";

/// Case-insensitive "first time seen" filter.
fn first_seen(seen: &mut HashSet<String>, key: &str) -> bool {
    seen.insert(key.trim().to_lowercase())
}

fn words_lower(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|w| w.trim_matches('.').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Projects
// ────────────────────────────────────────────────────────────────────────────

pub fn extract_projects(lines: &[&str], patterns: &PatternTable, cap: usize) -> Vec<Project> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(|line| patterns.strip_bullet(line))
        .filter_map(|line| {
            let caps = patterns.trigger(TriggerKind::Project, line)?;
            let captured = caps.get(1).map_or(line, |m| m.as_str()).trim();
            let (name, description) = match captured.split_once(" - ").or_else(|| captured.split_once(": ")) {
                Some((name, description)) => (name.trim(), description.trim()),
                None => (captured.trim_end_matches('.'), ""),
            };
            Some((name, description, technologies(line)))
        })
        .filter(|(name, _, _)| !name.is_empty() && first_seen(&mut seen, name))
        .take(cap)
        .enumerate()
        .map(|(index, (name, description, technologies))| Project {
            id: entry_id("project", index, name),
            name: name.to_string(),
            description: description.to_string(),
            technologies,
        })
        .collect()
}

/// Vocabulary terms mentioned in `line`, in order of appearance, as written.
fn technologies(line: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    line.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')' | '/'))
        .map(|w| w.trim_end_matches(['.', ':']))
        .filter(|w| w.chars().count() > 1 && TECHNICAL_VOCABULARY.contains(&w.to_lowercase().as_str()))
        .filter(|w| first_seen(&mut seen, w))
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Certifications
// ────────────────────────────────────────────────────────────────────────────

pub fn extract_certifications(lines: &[&str], patterns: &PatternTable, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(|line| patterns.strip_bullet(line))
        .filter(|line| patterns.trigger(TriggerKind::Certification, line).is_some())
        .filter(|line| first_seen(&mut seen, line))
        .take(cap)
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Languages
// ────────────────────────────────────────────────────────────────────────────

pub fn extract_languages(lines: &[&str], cap: usize) -> Vec<Language> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .flat_map(|line| split_items(line))
        .flat_map(|item| {
            let words = words_lower(item);
            let proficiency = proficiency(&item.to_lowercase());
            KNOWN_LANGUAGES
                .iter()
                .filter(move |lang| words.contains(&lang.to_lowercase()))
                .map(move |lang| (*lang, proficiency))
        })
        .filter(|(name, _)| first_seen(&mut seen, name))
        .take(cap)
        .enumerate()
        .map(|(index, (name, proficiency))| Language {
            id: entry_id("language", index, name),
            name: name.to_string(),
            proficiency: proficiency.to_string(),
        })
        .collect()
}

fn proficiency(item: &str) -> &'static str {
    PROFICIENCY_MARKERS
        .iter()
        .find(|(marker, _)| item.contains(marker))
        .map_or(DEFAULT_PROFICIENCY, |(_, level)| *level)
}

// ────────────────────────────────────────────────────────────────────────────
// Achievements
// ────────────────────────────────────────────────────────────────────────────

pub fn extract_achievements(lines: &[&str], patterns: &PatternTable, cap: usize) -> Vec<Achievement> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .map(|line| patterns.strip_bullet(line))
        .filter(|line| patterns.trigger(TriggerKind::Achievement, line).is_some())
        .filter(|line| first_seen(&mut seen, line))
        .take(cap)
        .enumerate()
        .map(|(index, title)| Achievement {
            id: entry_id("achievement", index, title),
            title: title.to_string(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Volunteer work
// ────────────────────────────────────────────────────────────────────────────

/// A trigger or `Role at Organization` line opens an entry; following
/// lines become its description.
pub fn extract_volunteer(lines: &[&str], patterns: &PatternTable, cap: usize) -> Vec<VolunteerWork> {
    let entries = lines.iter().fold(Vec::<(&str, Vec<&str>)>::new(), |mut entries, &line| {
        let text = patterns.strip_bullet(line);
        let opens = patterns.trigger(TriggerKind::Volunteer, text).is_some()
            || split_title(text, patterns).is_some();
        if opens {
            entries.push((text, Vec::new()));
        } else if let Some((_, description)) = entries.last_mut() {
            description.push(text);
        }
        entries
    });

    entries
        .into_iter()
        .take(cap)
        .enumerate()
        .map(|(index, (head, description))| {
            let (role, organization) =
                split_title(head, patterns).unwrap_or_else(|| (head.to_string(), String::new()));
            VolunteerWork {
                id: entry_id("volunteer", index, head),
                role,
                organization,
                description: description.join("\n"),
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Hobbies
// ────────────────────────────────────────────────────────────────────────────

pub fn extract_hobbies(lines: &[&str], cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .flat_map(|line| split_items(line))
        .filter(|item| {
            let words = words_lower(item);
            HOBBY_KEYWORDS.iter().any(|k| words.iter().any(|w| w == k))
        })
        .filter(|item| first_seen(&mut seen, item))
        .take(cap)
        .map(str::to_string)
        .collect()
}
