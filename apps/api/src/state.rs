use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::extraction::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Compiled once at startup; immutable and shared by every request.
    pub pipeline: Arc<Pipeline>,
    /// Bounds concurrent CPU-bound parses. A request that finds no permit gets 503.
    pub parse_limiter: Arc<Semaphore>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let pipeline = Pipeline::new(config.pipeline_config())?;
        Ok(AppState {
            pipeline: Arc::new(pipeline),
            parse_limiter: Arc::new(Semaphore::new(config.max_concurrent_parses)),
            config,
        })
    }
}
