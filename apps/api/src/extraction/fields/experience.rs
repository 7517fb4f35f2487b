//! Experience blocks: split on job-title lines, then read dates and description.

use crate::extraction::models::{entry_id, Experience};
use crate::extraction::patterns::PatternTable;

const MAX_POSITION_WORDS: usize = 6;
const MAX_COMPANY_WORDS: usize = 8;

/// `(position, company)` when `line` reads like `Title at Company`,
/// `Title - Company` or `Title | Company`.
pub(crate) fn split_title(line: &str, patterns: &PatternTable) -> Option<(String, String)> {
    patterns.title_separators.iter().find_map(|sep| {
        let caps = sep.captures(line)?;
        let position = caps[1].trim().trim_end_matches([',', '|', '-']).trim();
        let company = caps[2].trim().trim_end_matches([',', '|', '-']).trim();
        let words = |s: &str| s.split_whitespace().count();
        let capitalised = |s: &str| s.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());

        let plausible = (1..=MAX_POSITION_WORDS).contains(&words(position))
            && (1..=MAX_COMPANY_WORDS).contains(&words(company))
            && capitalised(position)
            && capitalised(company);
        plausible.then(|| (position.to_string(), company.to_string()))
    })
}

/// Title line with any date range cut out.
fn without_dates(line: &str, patterns: &PatternTable) -> String {
    patterns
        .date_range
        .replace_all(line, "")
        .trim()
        .trim_end_matches([',', '|', '-', '(', ')'])
        .trim()
        .to_string()
}

fn is_bulleted(line: &str, patterns: &PatternTable) -> bool {
    patterns
        .bullet_prefix
        .find(line)
        .is_some_and(|m| !m.as_str().trim().is_empty())
}

pub(crate) fn is_title_line(line: &str, patterns: &PatternTable) -> bool {
    if is_bulleted(line, patterns) {
        return false;
    }
    let title = without_dates(line, patterns);
    if title.is_empty() {
        return false;
    }
    split_title(&title, patterns).is_some()
        || (patterns.seniority_prefix.is_match(&title)
            && title.split_whitespace().count() <= MAX_POSITION_WORDS)
}

/// Blocks open at title lines; intro text before the first one is dropped.
/// A section without any title line is read as a single block.
pub fn extract_experience(lines: &[&str], patterns: &PatternTable, cap: usize) -> Vec<Experience> {
    let start = lines
        .iter()
        .position(|line| is_title_line(line, patterns))
        .unwrap_or(0);
    let blocks = lines[start..].iter().fold(Vec::<Vec<&str>>::new(), |mut blocks, &line| {
        if blocks.is_empty() || is_title_line(line, patterns) {
            blocks.push(vec![line]);
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
        blocks
    });

    blocks
        .iter()
        .filter_map(|block| parse_block(block, patterns))
        .take(cap)
        .enumerate()
        .map(|(index, mut exp)| {
            exp.id = entry_id("experience", index, &format!("{}|{}", exp.position, exp.company));
            exp
        })
        .collect()
}

fn parse_block(block: &[&str], patterns: &PatternTable) -> Option<Experience> {
    let (&first, rest) = block.split_first()?;

    let mut dates = patterns
        .date_range
        .captures(first)
        .map(|c| (c[1].to_string(), c[2].to_string()));

    let title = without_dates(first, patterns);
    let (position, company) = split_title(&title, patterns).unwrap_or((title, String::new()));
    if position.is_empty() && company.is_empty() {
        return None;
    }

    let mut description = Vec::new();
    for &line in rest {
        match patterns.date_range.captures(line) {
            Some(c) if dates.is_none() => dates = Some((c[1].to_string(), c[2].to_string())),
            Some(_) if without_dates(line, patterns).is_empty() => {}
            _ => description.push(line),
        }
    }

    let (start_date, end_date) = dates.unwrap_or_default();
    Some(Experience {
        id: uuid::Uuid::nil(),
        current: patterns.ongoing.is_match(&end_date),
        position,
        company,
        start_date,
        end_date,
        description: description.join("\n"),
    })
}
