//! Best-guess document language from stop-word frequency.

const STOPWORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &["the", "and", "of", "to", "in", "with", "for", "on", "at", "by", "from", "experience"],
    ),
    (
        "es",
        &["el", "la", "de", "que", "y", "en", "los", "las", "con", "por", "para", "experiencia"],
    ),
    (
        "fr",
        &["le", "la", "les", "des", "et", "en", "du", "une", "pour", "avec", "dans", "expérience"],
    ),
    (
        "de",
        &["der", "die", "und", "das", "mit", "für", "von", "zu", "bei", "ich", "im", "berufserfahrung"],
    ),
];

/// ISO 639-1 code of the language with the most stop-word hits, or `"unknown"`.
///
/// Ties keep the earlier table entry, so English wins a tie.
pub fn detect_language(text: &str) -> String {
    let mut counts = [0usize; 4];
    for word in text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        for (i, (_, stopwords)) in STOPWORDS.iter().enumerate() {
            if stopwords.contains(&word.as_str()) {
                counts[i] += 1;
            }
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (i, &count) in counts.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((i, count));
        }
    }
    best.map(|(i, _)| STOPWORDS[i].0.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
