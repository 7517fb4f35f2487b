//! Tunable thresholds for the extraction pipeline.
//!
//! Every size limit, list cap and score weight lives here so the pipeline
//! stages never hard-code their own constants. `PipelineConfig::default()`
//! carries the production values; the service overrides a few from env.

use serde::{Deserialize, Serialize};

pub const MIB: usize = 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Top-level config
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Uploads smaller than this are rejected as `FileEmpty`.
    pub min_file_bytes: usize,
    /// Uploads larger than this are rejected as `FileTooLarge`.
    pub max_file_bytes: usize,
    /// Ceiling on the inflated `word/document.xml` of a DOCX upload.
    pub max_docx_xml_bytes: usize,
    /// Normalized text shorter than this is `NoReadableText`.
    pub min_readable_chars: usize,
    /// Number of leading non-empty lines reserved for personal info.
    pub front_matter_lines: usize,
    pub summary_max_lines: usize,
    pub summary_max_chars: usize,
    /// Minimum clamped score a name candidate needs to be accepted.
    pub name_accept_threshold: f64,
    pub pdf: PdfLayoutConfig,
    pub text: TextDecodeConfig,
    pub caps: ListCaps,
    pub weights: ScoreWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_file_bytes: 10,
            max_file_bytes: 25 * MIB,
            max_docx_xml_bytes: 64 * MIB,
            min_readable_chars: 50,
            front_matter_lines: 20,
            summary_max_lines: 3,
            summary_max_chars: 500,
            name_accept_threshold: 0.5,
            pdf: PdfLayoutConfig::default(),
            text: TextDecodeConfig::default(),
            caps: ListCaps::default(),
            weights: ScoreWeights::default(),
        }
    }
}

/// Reading-order reconstruction parameters for positioned PDF text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfLayoutConfig {
    /// Items whose baselines differ by at most this many units share a line.
    pub line_merge_tolerance: f64,
    /// A space is inserted when the horizontal gap exceeds `ratio × glyph height`.
    pub word_gap_ratio: f64,
}

impl Default for PdfLayoutConfig {
    fn default() -> Self {
        Self {
            line_merge_tolerance: 5.0,
            word_gap_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDecodeConfig {
    pub min_printable_ratio: f64,
    pub min_printable_len: usize,
}

impl Default for TextDecodeConfig {
    fn default() -> Self {
        Self {
            min_printable_ratio: 0.7,
            min_printable_len: 10,
        }
    }
}

/// Upper bounds on every extracted list, guarding against noisy input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCaps {
    pub experience: usize,
    pub education: usize,
    pub skills: usize,
    pub projects: usize,
    pub certifications: usize,
    pub languages: usize,
    pub achievements: usize,
    pub volunteer: usize,
    pub hobbies: usize,
}

impl Default for ListCaps {
    fn default() -> Self {
        Self {
            experience: 15,
            education: 10,
            skills: 50,
            projects: 10,
            certifications: 15,
            languages: 10,
            achievements: 10,
            volunteer: 5,
            hobbies: 15,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quality score weights
// ────────────────────────────────────────────────────────────────────────────

/// Point budget for the overall quality score. The defaults sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub name: f64,
    pub email: f64,
    pub phone: f64,
    pub location: f64,
    pub links: f64,
    pub summary: f64,
    pub experience_present: f64,
    pub experience_complete: f64,
    pub education_present: f64,
    pub education_complete: f64,
    pub skills: f64,
    /// Skill count at which the skills weight is fully earned.
    pub skills_saturation: usize,
    /// Shared by projects, certifications, languages and achievements.
    pub other_sections: f64,
    pub text_richness: f64,
    pub words_for_half_richness: usize,
    pub words_for_full_richness: usize,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            name: 10.0,
            email: 10.0,
            phone: 7.0,
            location: 3.0,
            links: 2.0,
            summary: 3.0,
            experience_present: 10.0,
            experience_complete: 10.0,
            education_present: 8.0,
            education_complete: 7.0,
            skills: 15.0,
            skills_saturation: 10,
            other_sections: 5.0,
            text_richness: 10.0,
            words_for_half_richness: 150,
            words_for_full_richness: 400,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.name
            + self.email
            + self.phone
            + self.location
            + self.links
            + self.summary
            + self.experience_present
            + self.experience_complete
            + self.education_present
            + self.education_complete
            + self.skills
            + self.other_sections
            + self.text_richness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_100() {
        let w = ScoreWeights::default();
        assert!((w.total() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_size_bounds() {
        let c = PipelineConfig::default();
        assert_eq!(c.min_file_bytes, 10);
        assert_eq!(c.max_file_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn test_list_caps_match_bounded_lists() {
        let caps = ListCaps::default();
        assert_eq!(caps.projects, 10);
        assert_eq!(caps.certifications, 15);
        assert_eq!(caps.achievements, 10);
        assert_eq!(caps.volunteer, 5);
    }
}
