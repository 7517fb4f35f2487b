//! The document-understanding pipeline.
//!
//! Strategy → Extract → Normalize → Segment → Field-extract → Score →
//! Assemble, run sequentially on one in-memory buffer. A `Pipeline` holds
//! only immutable configuration and compiled patterns, so one instance is
//! shared by every concurrent request.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::extraction::assembler::assemble;
use crate::extraction::config::PipelineConfig;
use crate::extraction::error::{ExtractionError, Stage};
use crate::extraction::fields::extract_record;
use crate::extraction::formats;
use crate::extraction::models::{ParsedCv, RawDocument, Strategy};
use crate::extraction::normalizer::normalize;
use crate::extraction::patterns::{PatternTable, SectionLabel};
use crate::extraction::progress::{NoProgress, ProgressSink};
use crate::extraction::scoring::score;
use crate::extraction::segmenter::segment;
use crate::extraction::strategy::select_strategy;

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    patterns: PatternTable,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, regex::Error> {
        let patterns = PatternTable::compile()?;
        debug!(version = patterns.version, headers = patterns.headers.len(), "pattern table compiled");
        Ok(Self { config, patterns })
    }

    pub fn run(&self, doc: &RawDocument) -> Result<ParsedCv, ExtractionError> {
        self.run_with_progress(doc, &NoProgress)
    }

    pub fn run_with_progress(
        &self,
        doc: &RawDocument,
        progress: &dyn ProgressSink,
    ) -> Result<ParsedCv, ExtractionError> {
        let result = self.stages(doc, progress);
        if let Err(e) = &result {
            warn!(filename = %doc.filename, code = e.code(), error = %e, "CV parse failed");
        }
        result
    }

    fn stages(&self, doc: &RawDocument, progress: &dyn ProgressSink) -> Result<ParsedCv, ExtractionError> {
        let strategy = guarded(Stage::Strategy, || select_strategy(doc, &self.config))??;
        info!(filename = %doc.filename, size = doc.size(), strategy = strategy.as_str(), "strategy selected");
        progress.report(Stage::Strategy, 5);

        let mut extraction = guarded(extractor_stage(strategy), || {
            formats::extract(&doc.bytes, strategy, &self.config, &self.patterns)
        })??;
        progress.report(extractor_stage(strategy), 40);

        let text = guarded(Stage::Normalize, || normalize(&extraction.text, &self.patterns))?;
        let chars = text.chars().count();
        if chars < self.config.min_readable_chars {
            return Err(ExtractionError::NoReadableText { chars });
        }
        progress.report(Stage::Normalize, 50);

        let segmentation = guarded(Stage::Segment, || {
            segment(&text, &self.patterns, self.config.front_matter_lines)
        })?;
        let labels: Vec<&str> = segmentation.labels().iter().map(SectionLabel::as_str).collect();
        debug!(sections = ?labels, preamble = segmentation.preamble.len(), "segmented");
        progress.report(Stage::Segment, 60);

        let record = guarded(Stage::Fields, || {
            extract_record(&segmentation, &text, &self.patterns, &self.config)
        })?;
        progress.report(Stage::Fields, 80);

        let scores = guarded(Stage::Score, || {
            score(&record, &extraction.metadata, &self.patterns, &self.config.weights)
        })?;
        progress.report(Stage::Score, 90);

        // Downstream consumers only need the cleaned text.
        extraction.text = text;
        let parsed = guarded(Stage::Assemble, || assemble(record, scores, extraction, &self.patterns))?;
        progress.report(Stage::Assemble, 100);

        info!(
            filename = %doc.filename,
            quality = parsed.quality,
            experience = parsed.record.experience.len(),
            education = parsed.record.education.len(),
            skills = parsed.record.skills.len(),
            "CV parsed"
        );
        Ok(parsed)
    }
}

fn extractor_stage(strategy: Strategy) -> Stage {
    match strategy {
        Strategy::Pdf => Stage::Pdf,
        Strategy::Docx => Stage::Docx,
        Strategy::Doc => Stage::Doc,
        Strategy::Text => Stage::Text,
    }
}

/// Runs one stage, turning a panic into an `ExtractionFailure` tagged with `stage`.
fn guarded<T>(stage: Stage, f: impl FnOnce() -> T) -> Result<T, ExtractionError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| ExtractionError::failure(stage, panic_detail(payload)))
}

fn panic_detail(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "stage panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::models::SkillCategory;
    use crate::extraction::personal::is_valid_email;
    use std::sync::Mutex;

    const SCENARIO_A: &str = "Jane Doe\njane.doe@gmail.com\n(415) 555-2671\n\nEXPERIENCE\nSoftware Engineer at Acme Corp\nJanuary 2020 - Present\nBuilt scalable services.\n\nEDUCATION\nBachelor degree in Computer Science\nState University\n2016-2020";

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    fn text_doc(text: &str) -> RawDocument {
        RawDocument::new(text.as_bytes().to_vec(), "resume.txt", Some("text/plain".into()))
    }

    #[test]
    fn test_scenario_a_plain_text_cv() {
        let parsed = pipeline().run(&text_doc(SCENARIO_A)).unwrap();
        let cv = &parsed.record;
        assert_eq!(cv.personal_info.full_name, "Jane Doe");
        assert_eq!(cv.personal_info.email, "jane.doe@gmail.com");
        assert_eq!(cv.personal_info.phone, "(415) 555-2671");

        assert_eq!(cv.experience.len(), 1);
        let job = &cv.experience[0];
        assert_eq!(job.position, "Software Engineer");
        assert_eq!(job.company, "Acme Corp");
        assert_eq!(job.start_date, "January 2020");
        assert_eq!(job.end_date, "Present");
        assert!(job.current);

        assert_eq!(cv.education.len(), 1);
        assert!(cv.education[0].degree.contains("Bachelor degree in Computer Science"));
        assert_eq!(cv.education[0].institution, "State University");

        assert_eq!(parsed.strategy, Strategy::Text);
        assert_eq!(parsed.field_confidence["experience"], 90);
        assert_eq!(parsed.metadata.language, "en");
        assert!(parsed.quality > 50);
    }

    #[test]
    fn test_scenario_b_pdf_without_signature() {
        let doc = RawDocument::new(
            b"Hello, this is not a PDF at all".to_vec(),
            "resume.pdf",
            Some("application/pdf".into()),
        );
        let err = pipeline().run(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidFormat(_)));
    }

    #[test]
    fn test_scenario_c_too_little_text() {
        let err = pipeline().run(&text_doc("ok        \n\n")).unwrap_err();
        assert!(matches!(err, ExtractionError::NoReadableText { .. }));
        assert_eq!(err.code(), "NO_READABLE_TEXT");
    }

    #[test]
    fn test_size_bounds_checked_first() {
        let err = pipeline().run(&text_doc("tiny")).unwrap_err();
        assert!(matches!(err, ExtractionError::FileEmpty { size: 4, min: 10 }));
    }

    #[test]
    fn test_deterministic_output() {
        let p = pipeline();
        let first = p.run(&text_doc(SCENARIO_A)).unwrap();
        let second = p.run(&text_doc(SCENARIO_A)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_email_invariant_skips_placeholders() {
        let text = format!(
            "{}\nContact: someone@example.com\nReal: jane@janedoe.dev",
            SCENARIO_A
        );
        let parsed = pipeline().run(&text_doc(&text)).unwrap();
        let email = &parsed.record.personal_info.email;
        assert_eq!(email, "jane.doe@gmail.com");

        let text = "Pat Smith\nContact: test@example.com\nSUMMARY\nBackend developer with a decade of production systems work.";
        let parsed = pipeline().run(&text_doc(text)).unwrap();
        let email = &parsed.record.personal_info.email;
        assert!(email.is_empty() || (is_valid_email(email, &pipeline().patterns) && !email.ends_with("example.com")));
        assert_eq!(email, "");
    }

    #[test]
    fn test_bounded_lists() {
        let mut text = String::from("Jane Doe\nPROJECTS\n");
        for i in 0..30 {
            text.push_str(&format!("Project: Tool number {i}\n"));
        }
        text.push_str("CERTIFICATIONS\n");
        for i in 0..30 {
            text.push_str(&format!("Certified Widget Operator level {i}\n"));
        }
        text.push_str("ACHIEVEMENTS\n");
        for i in 0..30 {
            text.push_str(&format!("Won hackathon round {i}\n"));
        }
        text.push_str("VOLUNTEER\n");
        for i in 0..30 {
            text.push_str(&format!("Volunteered at shelter {i}\n"));
        }

        let cv = pipeline().run(&text_doc(&text)).unwrap().record;
        assert_eq!(cv.projects.len(), 10);
        assert_eq!(cv.certifications.len(), 15);
        assert_eq!(cv.achievements.len(), 10);
        assert_eq!(cv.volunteer_work.len(), 5);
    }

    #[test]
    fn test_skills_section_end_to_end() {
        let text = format!("{SCENARIO_A}\n\nSKILLS\nPython, React, Leadership, Communication");
        let cv = pipeline().run(&text_doc(&text)).unwrap().record;
        let categories: Vec<SkillCategory> = cv.skills.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            [
                SkillCategory::Technical,
                SkillCategory::Technical,
                SkillCategory::Soft,
                SkillCategory::Soft
            ]
        );
    }

    #[test]
    fn test_progress_reaches_completion() {
        let seen = Mutex::new(Vec::new());
        let sink = |stage: Stage, percent: u8| seen.lock().unwrap().push((stage, percent));
        pipeline().run_with_progress(&text_doc(SCENARIO_A), &sink).unwrap();
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&(Stage::Strategy, 5)));
        assert_eq!(seen.last(), Some(&(Stage::Assemble, 100)));
        assert!(seen.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn test_panicking_stage_is_tagged() {
        let err = guarded(Stage::Segment, || -> usize { panic!("boom") }).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::ExtractionFailure {
                stage: Stage::Segment,
                detail: "boom".into()
            }
        );
    }
}
