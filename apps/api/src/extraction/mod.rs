pub mod assembler;
pub mod config;
pub mod error;
pub mod fields;
pub mod formats;
pub mod handlers;
pub mod language;
pub mod models;
pub mod normalizer;
pub mod patterns;
pub mod personal;
pub mod pipeline;
pub mod progress;
pub mod scoring;
pub mod segmenter;
pub mod strategy;
