//! Confidence Scorer: per-field confidence and the overall quality score.
//!
//! Both are pure functions of the record and the extraction metadata, so a
//! given document always scores the same.

use crate::extraction::config::ScoreWeights;
use crate::extraction::models::{CvRecord, ExtractionMetadata, FieldConfidenceMap};
use crate::extraction::patterns::PatternTable;
use crate::extraction::personal::is_valid_email;

#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    pub field_confidence: FieldConfidenceMap,
    pub quality: u8,
}

pub fn score(
    record: &CvRecord,
    metadata: &ExtractionMetadata,
    patterns: &PatternTable,
    weights: &ScoreWeights,
) -> Scores {
    let facts = Facts::of(record, patterns);
    Scores {
        field_confidence: field_confidence(record, &facts),
        quality: quality(record, &facts, metadata.word_count, weights),
    }
}

/// Derived booleans shared by both scores.
struct Facts {
    name_words: usize,
    email_valid: bool,
    phone_digits: usize,
    experience_complete: bool,
    education_complete: bool,
}

impl Facts {
    fn of(record: &CvRecord, patterns: &PatternTable) -> Self {
        let pi = &record.personal_info;
        Self {
            name_words: pi.full_name.split_whitespace().count(),
            email_valid: !pi.email.is_empty() && is_valid_email(&pi.email, patterns),
            phone_digits: pi.phone.chars().filter(char::is_ascii_digit).count(),
            experience_complete: record
                .experience
                .iter()
                .any(|e| !e.position.is_empty() && !e.company.is_empty()),
            education_complete: record
                .education
                .iter()
                .any(|e| !e.degree.is_empty() && !e.institution.is_empty()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-field confidence
// ────────────────────────────────────────────────────────────────────────────

fn present(value: &str, confidence: u8) -> u8 {
    if value.is_empty() {
        0
    } else {
        confidence
    }
}

fn list<T>(items: &[T], confidence: u8) -> u8 {
    if items.is_empty() {
        0
    } else {
        confidence
    }
}

fn field_confidence(record: &CvRecord, facts: &Facts) -> FieldConfidenceMap {
    let pi = &record.personal_info;

    let name = match facts.name_words {
        0 => 0,
        1 => 50,
        _ => 90,
    };
    let phone = match facts.phone_digits {
        0 => 0,
        d if d >= 10 => 90,
        _ => 40,
    };
    let block = |present: bool, complete: bool| match (present, complete) {
        (_, true) => 90,
        (true, false) => 60,
        _ => 0,
    };
    let skills = match record.skills.len() {
        0 => 0,
        n => (40 + 5 * n).min(100) as u8,
    };

    [
        ("fullName", name),
        ("email", if facts.email_valid { 95 } else { 0 }),
        ("phone", phone),
        ("location", present(&pi.location, 70)),
        ("linkedin", present(&pi.linkedin, 85)),
        ("github", present(&pi.github, 85)),
        ("website", present(&pi.website, 75)),
        ("summary", present(&pi.summary, 70)),
        ("experience", block(!record.experience.is_empty(), facts.experience_complete)),
        ("education", block(!record.education.is_empty(), facts.education_complete)),
        ("skills", skills),
        ("projects", list(&record.projects, 70)),
        ("certifications", list(&record.certifications, 80)),
        ("languages", list(&record.languages, 75)),
        ("achievements", list(&record.achievements, 65)),
        ("volunteerWork", list(&record.volunteer_work, 65)),
        ("hobbies", list(&record.hobbies, 60)),
    ]
    .into_iter()
    .map(|(field, confidence)| (field.to_string(), confidence))
    .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Overall quality
// ────────────────────────────────────────────────────────────────────────────

fn earned(condition: bool, weight: f64) -> f64 {
    if condition {
        weight
    } else {
        0.0
    }
}

fn quality(record: &CvRecord, facts: &Facts, word_count: usize, w: &ScoreWeights) -> u8 {
    let pi = &record.personal_info;
    let has_links = !(pi.linkedin.is_empty() && pi.github.is_empty() && pi.website.is_empty());

    let personal = earned(facts.name_words > 0, w.name)
        + earned(facts.email_valid, w.email)
        + earned(facts.phone_digits >= 10, w.phone)
        + earned(!pi.location.is_empty(), w.location)
        + earned(has_links, w.links)
        + earned(!pi.summary.is_empty(), w.summary);

    let experience = earned(!record.experience.is_empty(), w.experience_present)
        + earned(facts.experience_complete, w.experience_complete);
    let education = earned(!record.education.is_empty(), w.education_present)
        + earned(facts.education_complete, w.education_complete);

    let saturation = w.skills_saturation.max(1);
    let skills = w.skills * record.skills.len().min(saturation) as f64 / saturation as f64;

    let others = [
        !record.projects.is_empty(),
        !record.certifications.is_empty(),
        !record.languages.is_empty(),
        !record.achievements.is_empty(),
    ];
    let other = w.other_sections * others.iter().filter(|&&b| b).count() as f64 / others.len() as f64;

    let richness = if word_count >= w.words_for_full_richness {
        w.text_richness
    } else if word_count >= w.words_for_half_richness {
        w.text_richness / 2.0
    } else {
        0.0
    };

    let total = personal + experience + education + skills + other + richness;
    total.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::models::{entry_id, Experience, PersonalInfo, Skill, SkillCategory};
    use crate::extraction::patterns::test_patterns;

    fn skill(name: &str) -> Skill {
        Skill {
            id: entry_id("skill", 0, name),
            name: name.to_string(),
            category: SkillCategory::Technical,
        }
    }

    fn scored(record: &CvRecord, words: usize) -> Scores {
        let metadata = ExtractionMetadata {
            word_count: words,
            ..Default::default()
        };
        score(record, &metadata, test_patterns(), &ScoreWeights::default())
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let scores = scored(&CvRecord::default(), 0);
        assert_eq!(scores.quality, 0);
        assert!(scores.field_confidence.values().all(|&c| c == 0));
    }

    #[test]
    fn test_personal_field_confidence() {
        let record = CvRecord {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                phone: "555-2671".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let fc = scored(&record, 0).field_confidence;
        assert_eq!(fc["fullName"], 90);
        assert_eq!(fc["email"], 0);
        assert_eq!(fc["phone"], 40);
    }

    #[test]
    fn test_experience_completeness() {
        let mut record = CvRecord::default();
        record.experience.push(Experience {
            id: entry_id("experience", 0, "x"),
            position: "Engineer".into(),
            company: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            current: false,
            description: String::new(),
        });
        assert_eq!(scored(&record, 0).field_confidence["experience"], 60);
        assert_eq!(scored(&record, 0).quality, 10);

        record.experience[0].company = "Acme".into();
        assert_eq!(scored(&record, 0).field_confidence["experience"], 90);
        assert_eq!(scored(&record, 0).quality, 20);
    }

    #[test]
    fn test_skills_saturate() {
        let mut record = CvRecord::default();
        record.skills = (0..5).map(|i| skill(&format!("s{i}"))).collect();
        let five = scored(&record, 0);
        assert_eq!(five.field_confidence["skills"], 65);
        assert_eq!(five.quality, 8); // 7.5 rounds up

        record.skills = (0..30).map(|i| skill(&format!("s{i}"))).collect();
        let thirty = scored(&record, 0);
        assert_eq!(thirty.field_confidence["skills"], 100);
        assert_eq!(thirty.quality, 15);
    }

    #[test]
    fn test_text_richness_bonus() {
        let record = CvRecord::default();
        assert_eq!(scored(&record, 149).quality, 0);
        assert_eq!(scored(&record, 150).quality, 5);
        assert_eq!(scored(&record, 400).quality, 10);
    }

    #[test]
    fn test_quality_is_capped() {
        let weights = ScoreWeights {
            text_richness: 500.0,
            ..Default::default()
        };
        let metadata = ExtractionMetadata {
            word_count: 1000,
            ..Default::default()
        };
        let scores = score(&CvRecord::default(), &metadata, test_patterns(), &weights);
        assert_eq!(scores.quality, 100);
    }
}
