use std::sync::Arc;

use crate::common::clock::{Clock, SystemClock};
use crate::common::random::{ScoreSource, SeededScores, ThreadRngScores};
use crate::server::config::{ServerConfig, UploadConfig};

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub upload: Arc<UploadConfig>,
    pub scores: Arc<dyn ScoreSource>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(upload: UploadConfig, scores: Arc<dyn ScoreSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            upload: Arc::new(upload),
            scores,
            clock,
        }
    }

    /// Build state from configuration: seeded scores when a seed is set, the
    /// wall clock for timestamps.
    pub fn from_config(config: &ServerConfig) -> Self {
        let scores: Arc<dyn ScoreSource> = match config.validation.random_seed {
            Some(seed) => Arc::new(SeededScores::new(seed)),
            None => Arc::new(ThreadRngScores),
        };
        Self::new(config.upload.clone(), scores, Arc::new(SystemClock))
    }
}
