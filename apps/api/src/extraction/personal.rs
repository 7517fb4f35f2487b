//! Personal Info Extractor: independent matchers over the front matter.
//!
//! Name is searched only in the front-matter window. Email, phone and
//! profile links fall back to the whole document when the window has none.

use crate::extraction::config::PipelineConfig;
use crate::extraction::models::PersonalInfo;
use crate::extraction::patterns::{PatternTable, SectionLabel, NAME_DENYLIST, PLACEHOLDER_EMAIL_DOMAINS};
use crate::extraction::segmenter::Segmentation;

pub fn extract_personal_info(
    seg: &Segmentation,
    full_text: &str,
    patterns: &PatternTable,
    config: &PipelineConfig,
) -> PersonalInfo {
    let front: Vec<&str> = seg.front_matter.iter().map(String::as_str).collect();
    let all: Vec<&str> = full_text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let linkedin = first_link(&patterns.linkedin, &front, &all);
    let github = first_link(&patterns.github, &front, &all);

    PersonalInfo {
        full_name: extract_name(&front, patterns, config.name_accept_threshold).unwrap_or_default(),
        email: find_email(&front, patterns)
            .or_else(|| find_email(&all, patterns))
            .unwrap_or_default(),
        phone: find_phone(&front, patterns)
            .or_else(|| find_phone(&all, patterns))
            .unwrap_or_default(),
        location: find_location(&front, patterns).unwrap_or_default(),
        website: find_website(&front, patterns).unwrap_or_default(),
        linkedin,
        github,
        summary: extract_summary(seg, config),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Name
// ────────────────────────────────────────────────────────────────────────────

/// Scores every name-shaped line and returns the best one above `threshold`.
pub fn extract_name(lines: &[&str], patterns: &PatternTable, threshold: f64) -> Option<String> {
    let mut best: Option<(f64, &str)> = None;
    for (index, &line) in lines.iter().enumerate() {
        if !(patterns.name_title_case.is_match(line) || patterns.name_all_caps.is_match(line)) {
            continue;
        }
        let score = name_score(line, index);
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, line));
        }
    }
    best.filter(|(score, _)| *score > threshold)
        .map(|(_, line)| line.to_string())
}

/// `max(0, 1 − 0.2·index) + 0.3·[2..=4 words] + 0.3·[all Title-Case] − 0.5·[denylisted]`, clamped to [0, 1].
pub fn name_score(candidate: &str, line_index: usize) -> f64 {
    let words: Vec<&str> = candidate.split_whitespace().collect();
    let position = (1.0 - 0.2 * line_index as f64).max(0.0);
    let word_count = if (2..=4).contains(&words.len()) { 0.3 } else { 0.0 };
    let title_case = if words.iter().all(|w| is_strict_title_case(w)) { 0.3 } else { 0.0 };
    let denied = words.iter().any(|w| {
        let w = w
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        NAME_DENYLIST.contains(&w.as_str())
    });
    let penalty = if denied { 0.5 } else { 0.0 };
    (position + word_count + title_case - penalty).clamp(0.0, 1.0)
}

fn is_strict_title_case(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_lowercase()),
        _ => false,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Contact details
// ────────────────────────────────────────────────────────────────────────────

/// Format-valid and not on a placeholder domain.
pub fn is_valid_email(email: &str, patterns: &PatternTable) -> bool {
    if !patterns.email_exact.is_match(email) {
        return false;
    }
    let domain = email
        .rsplit_once('@')
        .map(|(_, d)| d.to_ascii_lowercase())
        .unwrap_or_default();
    !PLACEHOLDER_EMAIL_DOMAINS
        .iter()
        .any(|p| domain == *p || domain.ends_with(&format!(".{p}")))
}

fn find_email(lines: &[&str], patterns: &PatternTable) -> Option<String> {
    lines
        .iter()
        .flat_map(|line| patterns.email.find_iter(line))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .find(|email| is_valid_email(email, patterns))
}

fn find_phone(lines: &[&str], patterns: &PatternTable) -> Option<String> {
    lines
        .iter()
        .find_map(|line| patterns.phone.find(line))
        .map(|m| format_phone(m.as_str()))
}

/// 10 digits → `(XXX) XXX-XXXX`; 11 digits with a leading 1 → `+1 (XXX) XXX-XXXX`.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => raw.trim().to_string(),
    }
}

fn with_scheme(url: &str) -> String {
    let url = url.trim_end_matches(['.', ',', ';']);
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn first_link(regex: &regex::Regex, front: &[&str], all: &[&str]) -> String {
    let find = |lines: &[&str]| lines.iter().find_map(|l| regex.find(l)).map(|m| with_scheme(m.as_str()));
    find(front).or_else(|| find(all)).unwrap_or_default()
}

/// Any URL-like token that is not an email, LinkedIn or GitHub address.
fn find_website(lines: &[&str], patterns: &PatternTable) -> Option<String> {
    lines
        .iter()
        .flat_map(|line| line.split(|c: char| c.is_whitespace() || c == '|'))
        .map(|token| token.trim_matches(|c: char| matches!(c, ',' | ';' | '(' | ')' | '<' | '>' | '[' | ']' | '"' | '\'')))
        .filter(|token| !token.is_empty() && !token.contains('@'))
        .filter(|token| !patterns.linkedin.is_match(token) && !patterns.github.is_match(token))
        .find(|token| patterns.website.is_match(token))
        .map(with_scheme)
}

fn find_location(lines: &[&str], patterns: &PatternTable) -> Option<String> {
    let labelled = lines.iter().find_map(|line| {
        patterns
            .location_label
            .captures(line)
            .map(|caps| caps[1].trim().to_string())
    });
    labelled
        .filter(|l| !l.is_empty())
        .or_else(|| {
            lines
                .iter()
                .find(|line| patterns.city_region.is_match(line))
                .map(|line| line.to_string())
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

/// First lines under the summary header, joined and capped.
fn extract_summary(seg: &Segmentation, config: &PipelineConfig) -> String {
    let joined = seg
        .lines_for(SectionLabel::Summary)
        .into_iter()
        .take(config.summary_max_lines)
        .collect::<Vec<_>>()
        .join(" ");
    joined.chars().take(config.summary_max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::patterns::test_patterns;
    use crate::extraction::segmenter::segment;

    fn info(text: &str) -> PersonalInfo {
        let config = PipelineConfig::default();
        let seg = segment(text, test_patterns(), config.front_matter_lines);
        extract_personal_info(&seg, text, test_patterns(), &config)
    }

    #[test]
    fn test_placeholder_email_rejected() {
        let pi = info("Contact: test@example.com");
        assert_eq!(pi.email, "");
    }

    #[test]
    fn test_first_valid_email_wins() {
        let pi = info("Jane Doe\nfake@example.com | jane.doe@gmail.com | other@gmail.com");
        assert_eq!(pi.email, "jane.doe@gmail.com");
    }

    #[test]
    fn test_email_found_outside_front_matter() {
        let mut text = String::from("Jane Doe\n");
        for i in 0..25 {
            text.push_str(&format!("Line number {i} of filler\n"));
        }
        text.push_str("Contact me at jane@doe.dev");
        assert_eq!(info(&text).email, "jane@doe.dev");
    }

    #[test]
    fn test_name_scoring() {
        assert!((name_score("Jane Doe", 0) - 1.0).abs() < f64::EPSILON);
        // index 3: 0.4 + 0.3 + 0.3 = 1.0 (clamped)
        assert!((name_score("Jane Doe", 3) - 1.0).abs() < f64::EPSILON);
        // index 6: 0 + 0.3 + 0.3
        assert!((name_score("Jane Doe", 6) - 0.6).abs() < 1e-9);
        // all caps fails strict title case: 1 + 0.3
        assert!((name_score("JANE DOE", 0) - 1.0).abs() < f64::EPSILON);
        assert!((name_score("JANE DOE", 4) - 0.5).abs() < 1e-9);
        // denylisted: 0.6 + 0.3 + 0.3 - 0.5
        assert!((name_score("Curriculum Resume", 2) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_name_rejected_below_threshold() {
        let p = test_patterns();
        assert_eq!(extract_name(&["EXPERIENCE"], p, 0.5), None);
        assert_eq!(
            extract_name(&["jane@mail.com", "Jane Doe"], p, 0.5),
            Some("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_phone_formats() {
        assert_eq!(format_phone("415.555.2671"), "(415) 555-2671");
        assert_eq!(format_phone("+1 415 555 2671"), "+1 (415) 555-2671");
        assert_eq!(format_phone("555 2671 99"), "555 2671 99");
        assert_eq!(info("Jane Doe\nTel: 415-555-2671").phone, "(415) 555-2671");
    }

    #[test]
    fn test_links_deduplicated() {
        let pi = info(
            "Jane Doe\nlinkedin.com/in/janedoe | github.com/janedoe | janedoe.dev | jane@janedoe.dev",
        );
        assert_eq!(pi.linkedin, "https://linkedin.com/in/janedoe");
        assert_eq!(pi.github, "https://github.com/janedoe");
        assert_eq!(pi.website, "https://janedoe.dev");
        assert_eq!(pi.email, "jane@janedoe.dev");
    }

    #[test]
    fn test_location_label() {
        assert_eq!(info("Jane Doe\nLocation: Madrid, Spain").location, "Madrid, Spain");
        assert_eq!(info("Jane Doe\nSan Francisco, CA").location, "San Francisco, CA");
    }

    #[test]
    fn test_summary_capped_to_three_lines() {
        let pi = info("Jane Doe\nSummary\nLine one.\nLine two.\nLine three.\nLine four.");
        assert_eq!(pi.summary, "Line one. Line two. Line three.");
    }
}
