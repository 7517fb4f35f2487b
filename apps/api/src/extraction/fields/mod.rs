//! Section Field Extractors.
//!
//! Each extractor takes the line block of one section label and returns a
//! capped, typed list. [`extract_record`] maps every block through its
//! extractor and pairs the result with the personal info.

pub mod education;
pub mod experience;
pub mod lists;
pub mod skills;

use crate::extraction::config::PipelineConfig;
use crate::extraction::models::CvRecord;
use crate::extraction::patterns::{PatternTable, SectionLabel};
use crate::extraction::personal::extract_personal_info;
use crate::extraction::segmenter::Segmentation;

/// Items of an inline list, split on `,` `;` `|` and `•`.
pub(crate) fn split_items(line: &str) -> impl Iterator<Item = &str> + '_ {
    line.split([',', ';', '|', '•'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

pub fn extract_record(
    seg: &Segmentation,
    text: &str,
    patterns: &PatternTable,
    config: &PipelineConfig,
) -> CvRecord {
    let caps = &config.caps;
    let block = |label: SectionLabel| seg.lines_for(label);

    CvRecord {
        personal_info: extract_personal_info(seg, text, patterns, config),
        experience: experience::extract_experience(&block(SectionLabel::Experience), patterns, caps.experience),
        education: education::extract_education(&block(SectionLabel::Education), patterns, caps.education),
        skills: skills::extract_skills(&block(SectionLabel::Skills), patterns, caps.skills),
        projects: lists::extract_projects(&block(SectionLabel::Projects), patterns, caps.projects),
        certifications: lists::extract_certifications(
            &block(SectionLabel::Certifications),
            patterns,
            caps.certifications,
        ),
        languages: lists::extract_languages(&block(SectionLabel::Languages), caps.languages),
        achievements: lists::extract_achievements(
            &block(SectionLabel::Achievements),
            patterns,
            caps.achievements,
        ),
        volunteer_work: lists::extract_volunteer(&block(SectionLabel::Volunteer), patterns, caps.volunteer),
        hobbies: lists::extract_hobbies(&block(SectionLabel::Hobbies), caps.hobbies),
    }
}
