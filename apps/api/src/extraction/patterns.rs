//! Declarative pattern and vocabulary tables shared by every text stage.
//!
//! All regular expressions the pipeline uses are declared here as
//! `{label, pattern, priority}` rows, compiled once into a [`PatternTable`]
//! and passed explicitly to the normalizer, segmenter and field extractors.
//! Bump [`PATTERN_TABLE_VERSION`] whenever a row changes meaning.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

pub const PATTERN_TABLE_VERSION: u32 = 2;

// ────────────────────────────────────────────────────────────────────────────
// Labels
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
    References,
    Achievements,
    Volunteer,
    Hobbies,
}

impl SectionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Summary => "summary",
            SectionLabel::Experience => "experience",
            SectionLabel::Education => "education",
            SectionLabel::Skills => "skills",
            SectionLabel::Projects => "projects",
            SectionLabel::Certifications => "certifications",
            SectionLabel::Languages => "languages",
            SectionLabel::References => "references",
            SectionLabel::Achievements => "achievements",
            SectionLabel::Volunteer => "volunteer",
            SectionLabel::Hobbies => "hobbies",
        }
    }
}

/// Line-level triggers for the list extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Project,
    Certification,
    Achievement,
    Volunteer,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternRow<L: 'static> {
    pub label: L,
    pub pattern: &'static str,
    /// Higher wins when several rows match the same line.
    pub priority: u8,
}

#[derive(Debug, Clone)]
pub struct CompiledPattern<L> {
    pub label: L,
    pub regex: Regex,
    pub priority: u8,
}

// ────────────────────────────────────────────────────────────────────────────
// Section headers (English, Spanish, French, German)
// ────────────────────────────────────────────────────────────────────────────

/// Header rows are wrapped in `^…$` with optional decoration, case-insensitive.
const SECTION_HEADERS: &[PatternRow<SectionLabel>] = &[
    PatternRow {
        label: SectionLabel::Summary,
        pattern: r"(?:professional\s+|career\s+)?(?:summary|profile)|about(?:\s+me)?|(?:career\s+)?objective|resumen(?:\s+profesional)?|perfil(?:\s+profesional)?|sobre\s+m[ií]|profil(?:\s+professionnel)?|[àa]\s+propos(?:\s+de\s+moi)?|objectif|zusammenfassung|kurzprofil|[üu]ber\s+mich",
        priority: 5,
    },
    PatternRow {
        label: SectionLabel::Experience,
        pattern: r"(?:work|professional|relevant)?\s*experience|employment(?:\s+history)?|work\s+history|career\s+history|experiencia(?:\s+laboral|\s+profesional)?|exp[ée]riences?(?:\s+professionnelles?)?|berufserfahrung|berufliche\s+erfahrung|beruflicher\s+werdegang|erfahrung",
        priority: 10,
    },
    PatternRow {
        label: SectionLabel::Education,
        pattern: r"education(?:\s+(?:&|and)\s+training)?|academic\s+(?:background|history)|qualifications|educaci[óo]n|formaci[óo]n(?:\s+acad[ée]mica)?|estudios|formation|[ée]ducation|[ée]tudes|ausbildung|bildung(?:sweg)?|studium",
        priority: 10,
    },
    PatternRow {
        label: SectionLabel::Skills,
        pattern: r"(?:technical\s+|core\s+|key\s+)?skills|(?:core\s+)?competencies|expertise|technologies|habilidades|competencias|conocimientos|comp[ée]tences(?:\s+techniques)?|f[äa]higkeiten|kenntnisse|kompetenzen",
        priority: 8,
    },
    PatternRow {
        label: SectionLabel::Projects,
        pattern: r"(?:personal\s+|key\s+|selected\s+)?projects|proyectos|projets|projekte",
        priority: 8,
    },
    PatternRow {
        label: SectionLabel::Certifications,
        pattern: r"certifications|certificates|licen[cs]es(?:\s+(?:&|and)\s+certifications)?|certificaciones|certificados|zertifikate|zertifizierungen",
        priority: 8,
    },
    PatternRow {
        label: SectionLabel::Languages,
        pattern: r"languages|language\s+skills|idiomas|lenguas|langues|sprachen|sprachkenntnisse",
        priority: 8,
    },
    PatternRow {
        label: SectionLabel::References,
        pattern: r"references|referencias|r[ée]f[ée]rences|referenzen",
        priority: 4,
    },
    PatternRow {
        label: SectionLabel::Achievements,
        pattern: r"achievements|accomplishments|awards(?:\s+(?:&|and)\s+hono(?:u)?rs)?|hono(?:u)?rs|logros|premios|r[ée]alisations|distinctions|auszeichnungen|erfolge",
        priority: 7,
    },
    PatternRow {
        label: SectionLabel::Volunteer,
        pattern: r"volunteer(?:ing)?(?:\s+(?:experience|work))?|community\s+service|voluntariado|b[ée]n[ée]volat|ehrenamt(?:liches\s+engagement)?",
        priority: 9,
    },
    PatternRow {
        label: SectionLabel::Hobbies,
        pattern: r"hobbies(?:\s+(?:&|and)\s+interests)?|interests|pasatiempos|aficiones|intereses|loisirs|centres\s+d['’]int[ée]r[êe]t|hobbys|interessen|freizeit",
        priority: 6,
    },
];

// ────────────────────────────────────────────────────────────────────────────
// List triggers
// ────────────────────────────────────────────────────────────────────────────

/// Project rows capture the project name in group 1.
const TRIGGERS: &[PatternRow<TriggerKind>] = &[
    PatternRow {
        label: TriggerKind::Project,
        pattern: r"(?i)^projects?\s*[:\-]\s*(.+)$",
        priority: 10,
    },
    PatternRow {
        label: TriggerKind::Project,
        pattern: r"(?i)^(?:built|developed|created)\s+(.+)$",
        priority: 5,
    },
    PatternRow {
        label: TriggerKind::Certification,
        pattern: r"(?i)\bcertifi(?:ed|cate|cation)\b",
        priority: 10,
    },
    PatternRow {
        label: TriggerKind::Certification,
        pattern: r"(?i)\b(?:aws|azure|google\s+cloud|gcp|cisco|ccna|ccnp|comptia|pmp|prince2|itil|cissp|cisa|cism|oracle|microsoft|salesforce|scrum|csm|cka|ckad|red\s+hat|rhce|toefl|ielts)\b",
        priority: 5,
    },
    PatternRow {
        label: TriggerKind::Achievement,
        pattern: r"(?i)\b(?:awarded?|won|achieved|recogni[sz]ed|hono(?:u)?red)\b",
        priority: 10,
    },
    PatternRow {
        label: TriggerKind::Achievement,
        pattern: r"\d+(?:\.\d+)?\s?%",
        priority: 5,
    },
    PatternRow {
        label: TriggerKind::Achievement,
        pattern: r"(?i)\bincreased\b.*\bby\b",
        priority: 5,
    },
    PatternRow {
        label: TriggerKind::Volunteer,
        pattern: r"(?i)\b(?:volunteer(?:ed)?|community\s+service|helped|donated|charity)\b",
        priority: 10,
    },
];

// ────────────────────────────────────────────────────────────────────────────
// Normalizer rows
// ────────────────────────────────────────────────────────────────────────────

/// OCR confusions as `(pattern, replacement)`. Multi-line mode.
const OCR_CORRECTIONS: &[(&str, &str)] = &[
    // standalone lowercase l is almost always a misread capital I
    (r"(?m)(^|\s)l(\s|$)", "${1}I${2}"),
    // standalone 0 on a line with no other digits
    (r"(?m)^([^\d\n]*\s)?0(\s[^\d\n]*)?$", "${1}O${2}"),
    (r"(\d)O", "${1}0"),
    (r"O(\d)", "0${1}"),
    // only at token start: mid-word rn/vv are usually genuine (learn, savvy)
    (r"\brn([a-z])", "m${1}"),
    (r"\bvv([a-z])", "w${1}"),
];

const PAGE_ARTIFACTS: &[&str] = &[
    r"(?i)^page\s+\d+(?:\s+of\s+\d+)?$",
    r"^\d+$",
    r"^\d+\s*/\s*\d+$",
    r"^[-_=*~•·.\s]{3,}$",
];

// ────────────────────────────────────────────────────────────────────────────
// Vocabularies
// ────────────────────────────────────────────────────────────────────────────

pub const PLACEHOLDER_EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "domain.com",
    "test.com",
];

/// Words that disqualify a name candidate.
pub const NAME_DENYLIST: &[&str] = &["experience", "education", "skills", "resume", "cv"];

/// Lower-cased terms that mark a skill as technical.
pub const TECHNICAL_VOCABULARY: &[&str] = &[
    // languages
    "python", "java", "javascript", "typescript", "rust", "go", "golang", "c", "c++", "c#",
    "ruby", "php", "swift", "kotlin", "scala", "r", "matlab", "perl", "haskell", "elixir",
    "sql", "html", "css", "bash", "shell", "dart", "lua",
    // frameworks & libraries
    "react", "angular", "vue", "svelte", "next.js", "node", "node.js", "express", "django",
    "flask", "fastapi", "spring", "rails", ".net", "laravel", "tensorflow", "pytorch",
    "pandas", "numpy", "scikit-learn", "jquery", "redux", "graphql", "tailwind",
    // data & storage
    "postgresql", "postgres", "mysql", "mongodb", "redis", "elasticsearch", "kafka",
    "spark", "hadoop", "sqlite", "oracle", "dynamodb", "snowflake",
    // cloud & devops
    "aws", "azure", "gcp", "docker", "kubernetes", "terraform", "ansible", "jenkins",
    "git", "github", "gitlab", "ci/cd", "linux", "nginx", "serverless", "lambda",
    "microservices", "rest", "api", "devops",
    // practices & fields
    "machine learning", "deep learning", "data analysis", "nlp", "excel", "tableau",
    "power bi", "figma", "agile", "scrum", "jira",
];

pub const KNOWN_LANGUAGES: &[&str] = &[
    "English", "Spanish", "French", "German", "Italian", "Portuguese", "Chinese", "Mandarin",
    "Cantonese", "Japanese", "Korean", "Arabic", "Hindi", "Russian", "Dutch", "Swedish",
    "Norwegian", "Danish", "Finnish", "Polish", "Turkish", "Greek", "Hebrew", "Vietnamese",
    "Thai", "Indonesian", "Malay", "Bengali", "Urdu", "Persian", "Ukrainian", "Czech",
    "Romanian", "Hungarian", "Tagalog", "Swahili", "Catalan",
];

/// `(marker, proficiency)`; first match wins.
pub const PROFICIENCY_MARKERS: &[(&str, &str)] = &[
    ("native", "Native"),
    ("mother tongue", "Native"),
    ("fluent", "Fluent"),
    ("advanced", "Advanced"),
    ("intermediate", "Intermediate"),
    ("basic", "Basic"),
    ("beginner", "Basic"),
    ("elementary", "Basic"),
];

pub const HOBBY_KEYWORDS: &[&str] = &[
    "reading", "writing", "photography", "traveling", "travelling", "travel", "hiking",
    "running", "cycling", "swimming", "yoga", "cooking", "baking", "gardening", "painting",
    "drawing", "music", "guitar", "piano", "singing", "dancing", "chess", "gaming",
    "football", "soccer", "basketball", "tennis", "climbing", "skiing", "surfing",
    "fishing", "camping", "volunteering", "blogging", "podcasts", "movies", "theater",
    "meditation", "woodworking", "knitting",
];

// ────────────────────────────────────────────────────────────────────────────
// Compiled table
// ────────────────────────────────────────────────────────────────────────────

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

/// Every pattern the pipeline uses, compiled once at startup.
#[derive(Debug, Clone)]
pub struct PatternTable {
    pub version: u32,
    pub headers: Vec<CompiledPattern<SectionLabel>>,
    pub triggers: Vec<CompiledPattern<TriggerKind>>,
    pub ocr: Vec<(Regex, &'static str)>,
    pub page_artifacts: Vec<Regex>,
    pub horizontal_ws: Regex,
    pub blank_run: Regex,
    pub short_meaningful: Regex,
    pub bullet_prefix: Regex,
    pub email: Regex,
    pub email_exact: Regex,
    pub phone: Regex,
    pub linkedin: Regex,
    pub github: Regex,
    pub website: Regex,
    pub location_label: Regex,
    pub city_region: Regex,
    pub name_title_case: Regex,
    pub name_all_caps: Regex,
    pub date_range: Regex,
    pub title_separators: Vec<Regex>,
    pub seniority_prefix: Regex,
    pub degree: Regex,
    pub institution: Regex,
    pub field_of_study: Regex,
    pub year_range: Regex,
    pub year: Regex,
    pub gpa: Regex,
    /// End dates meaning the role is still held.
    pub ongoing: Regex,
    pub docx_paragraph: Regex,
    pub docx_run_text: Regex,
}

impl PatternTable {
    pub fn compile() -> Result<Self, regex::Error> {
        let headers = SECTION_HEADERS
            .iter()
            .map(|row| {
                Ok(CompiledPattern {
                    label: row.label,
                    regex: Regex::new(&format!(
                        r"(?i)^[\s#*=\-_:|•]*(?:{})[\s:=\-_|•]*$",
                        row.pattern
                    ))?,
                    priority: row.priority,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let triggers = TRIGGERS
            .iter()
            .map(|row| {
                Ok(CompiledPattern {
                    label: row.label,
                    regex: Regex::new(row.pattern)?,
                    priority: row.priority,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let ocr = OCR_CORRECTIONS
            .iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, *replacement)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let page_artifacts = PAGE_ARTIFACTS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let endpoint = format!(r"{MONTH}\s+\d{{4}}|\d{{1,2}}/\d{{4}}|\d{{4}}");

        Ok(Self {
            version: PATTERN_TABLE_VERSION,
            headers,
            triggers,
            ocr,
            page_artifacts,
            horizontal_ws: Regex::new(r"[ \t\u{00A0}\u{2000}-\u{200B}\u{3000}]+")?,
            blank_run: Regex::new(r"\n{4,}")?,
            short_meaningful: Regex::new(r"^[A-Z][A-Za-z+#]{0,2}$")?,
            bullet_prefix: Regex::new(r"^[\s•·▪◦‣●○■□*>\-]+")?,
            email: Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}")?,
            email_exact: Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")?,
            phone: Regex::new(r"(?:\+?1[\s.\-]?)?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4}")?,
            linkedin: Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/(?:in|pub)/[A-Za-z0-9_%\-]+/?")?,
            github: Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/[A-Za-z0-9_\-]+/?")?,
            website: Regex::new(r"^(?:https?://)?(?:www\.)?[A-Za-z0-9][A-Za-z0-9\-]*(?:\.[A-Za-z0-9\-]+)*\.(?:com|io|dev|net|org|me|co|app|ai|tech|site|xyz|info|page)(?:/\S*)?$")?,
            location_label: Regex::new(r"(?i)\b(?:location|address|based(?:\s+in)?|from)\s*:\s*([^|•]+)")?,
            city_region: Regex::new(r"^\p{Lu}[\p{L}.\s]+,\s*(?:[A-Z]{2}|\p{Lu}\p{Ll}+)(?:\s+\d{5})?$")?,
            name_title_case: Regex::new(r"^\p{Lu}[\p{L}'\-]+(?:\s+\p{Lu}[\p{L}'\-.]*){1,3}$")?,
            name_all_caps: Regex::new(r"^\p{Lu}[\p{Lu}'\-.]+(?:\s+\p{Lu}[\p{Lu}'\-.]*){0,3}$")?,
            date_range: Regex::new(&format!(
                r"(?i)\b({endpoint})\s*(?:-|to|until)\s*({endpoint}|present|current|now)\b"
            ))?,
            title_separators: vec![
                Regex::new(r"(?i)^(.+?)\s+at\s+(.+)$")?,
                Regex::new(r"^(.+?)\s+-\s+(.+)$")?,
                Regex::new(r"^(.+?)\s*\|\s*(.+)$")?,
            ],
            seniority_prefix: Regex::new(r"(?i)^(?:senior|sr\.?|junior|jr\.?|lead|principal|staff|chief|head\s+of|vice\s+president|vp|director|intern)\b")?,
            degree: Regex::new(r"(?i)\b(?:bachelor|master|doctorate|diploma|certificate|degree|(?:ph\.?\s?d|mba|b\.?\s?sc?|b\.?\s?a|m\.?\s?sc?|m\.?\s?a)\b)")?,
            institution: Regex::new(r"(?i)\b(?:university|college|institute|school|academy|polytechnic|universidad|universit[ée]|universit[äa]t|hochschule)\b")?,
            field_of_study: Regex::new(r"\b(?:[Ii]n|[Oo]f)\s+(\p{Lu}[\p{L}&]*(?:\s+(?:\p{Lu}[\p{L}&]*|and|of|&))*)")?,
            year_range: Regex::new(r"(?i)\b((?:19|20)\d{2})\s*(?:-|to)\s*((?:19|20)\d{2}|present|current)\b")?,
            year: Regex::new(r"\b(?:19|20)\d{2}\b")?,
            gpa: Regex::new(r"(?i)\bgpa\s*:?\s*(\d(?:\.\d{1,2})?)")?,
            ongoing: Regex::new(r"(?i)^(?:present|current|now)$")?,
            docx_paragraph: Regex::new(r"(?s)<w:p[ >].*?</w:p>")?,
            docx_run_text: Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>")?,
        })
    }

    /// Section whose header matches `line`; highest priority wins, ties keep table order.
    pub fn section_for(&self, line: &str) -> Option<SectionLabel> {
        let mut best: Option<&CompiledPattern<SectionLabel>> = None;
        for header in &self.headers {
            if header.regex.is_match(line) && best.map_or(true, |b| header.priority > b.priority) {
                best = Some(header);
            }
        }
        best.map(|h| h.label)
    }

    /// First trigger of `kind` matching `line`, by descending priority.
    pub fn trigger<'t>(&self, kind: TriggerKind, line: &'t str) -> Option<Captures<'t>> {
        let mut rows: Vec<&CompiledPattern<TriggerKind>> =
            self.triggers.iter().filter(|t| t.label == kind).collect();
        rows.sort_by(|a, b| b.priority.cmp(&a.priority));
        rows.into_iter().find_map(|row| row.regex.captures(line))
    }

    /// `line` without leading bullet glyphs and dashes.
    pub fn strip_bullet<'t>(&self, line: &'t str) -> &'t str {
        match self.bullet_prefix.find(line) {
            Some(m) => line[m.end()..].trim(),
            None => line.trim(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_patterns() -> &'static PatternTable {
    use once_cell::sync::Lazy;
    static PATTERNS: Lazy<PatternTable> = Lazy::new(|| PatternTable::compile().unwrap());
    &PATTERNS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_compiles() {
        let table = PatternTable::compile().unwrap();
        assert_eq!(table.version, PATTERN_TABLE_VERSION);
        assert_eq!(table.headers.len(), SECTION_HEADERS.len());
    }

    #[test]
    fn test_ongoing_and_docx_markup() {
        let p = test_patterns();
        assert!(p.ongoing.is_match("Present"));
        assert!(!p.ongoing.is_match("Presently"));
        assert!(p.docx_paragraph.is_match("<w:p><w:r><w:t>x</w:t></w:r></w:p>"));
        assert!(!p.docx_paragraph.is_match("<w:pPr/>"));
        let run = p.docx_run_text.captures(r#"<w:t xml:space="preserve">Doe</w:t>"#).unwrap();
        assert_eq!(&run[1], "Doe");
    }

    #[test]
    fn test_multilingual_headers() {
        let p = test_patterns();
        assert_eq!(p.section_for("EXPERIENCE"), Some(SectionLabel::Experience));
        assert_eq!(p.section_for("Work Experience:"), Some(SectionLabel::Experience));
        assert_eq!(p.section_for("Experiencia Laboral"), Some(SectionLabel::Experience));
        assert_eq!(p.section_for("Expérience professionnelle"), Some(SectionLabel::Experience));
        assert_eq!(p.section_for("Berufserfahrung"), Some(SectionLabel::Experience));
        assert_eq!(p.section_for("Formación Académica"), Some(SectionLabel::Education));
        assert_eq!(p.section_for("Compétences"), Some(SectionLabel::Skills));
        assert_eq!(p.section_for("## Skills ##"), Some(SectionLabel::Skills));
        assert_eq!(p.section_for("Sprachen"), Some(SectionLabel::Languages));
        assert_eq!(p.section_for("Volunteer Experience"), Some(SectionLabel::Volunteer));
        assert_eq!(p.section_for("Hobbies & Interests"), Some(SectionLabel::Hobbies));
    }

    #[test]
    fn test_content_lines_are_not_headers() {
        let p = test_patterns();
        assert_eq!(p.section_for("5 years of experience in Rust"), None);
        assert_eq!(p.section_for("Software Engineer at Acme Corp"), None);
        assert_eq!(p.section_for("Bachelor degree in Computer Science"), None);
    }

    #[test]
    fn test_trigger_priority() {
        let p = test_patterns();
        let caps = p.trigger(TriggerKind::Project, "Project: Ledger sync engine").unwrap();
        assert_eq!(&caps[1], "Ledger sync engine");
        assert!(p.trigger(TriggerKind::Project, "Maintained the wiki").is_none());
    }

    #[test]
    fn test_date_range_pattern() {
        let p = test_patterns();
        let caps = p.date_range.captures("January 2020 - Present").unwrap();
        assert_eq!(&caps[1], "January 2020");
        assert_eq!(&caps[2], "Present");
        let caps = p.date_range.captures("03/2018 to 12/2019").unwrap();
        assert_eq!(&caps[1], "03/2018");
        assert_eq!(&caps[2], "12/2019");
    }

    #[test]
    fn test_strip_bullet() {
        let p = test_patterns();
        assert_eq!(p.strip_bullet("• Built a thing"), "Built a thing");
        assert_eq!(p.strip_bullet("  - Led a team"), "Led a team");
        assert_eq!(p.strip_bullet("Plain"), "Plain");
    }
}
