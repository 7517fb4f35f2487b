use std::str::FromStr;

use anyhow::{Context, Result};

use crate::extraction::config::{PipelineConfig, MIB};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_mb: usize,
    pub max_concurrent_parses: usize,
    pub front_matter_lines: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_mb: env_or("MAX_UPLOAD_MB", 25)?,
            max_concurrent_parses: env_or("MAX_CONCURRENT_PARSES", 4)?,
            front_matter_lines: env_or("FRONT_MATTER_LINES", 20)?,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * MIB
    }

    /// Pipeline thresholds with the service overrides applied.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_file_bytes: self.max_upload_bytes(),
            front_matter_lines: self.front_matter_lines,
            ..PipelineConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_mb: 25,
            max_concurrent_parses: 4,
            front_matter_lines: 20,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_overrides() {
        let config = Config {
            max_upload_mb: 5,
            front_matter_lines: 12,
            ..Config::default()
        };
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.max_file_bytes, 5 * MIB);
        assert_eq!(pipeline.front_matter_lines, 12);
        assert_eq!(pipeline.min_readable_chars, 50);
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: usize = env_or("CVPARSE_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
