//! Structured run logging.
//!
//! Every reel generation gets a run id so interleaved output from several
//! runs (or a JSON log pipeline) can be grouped.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Logger carrying the run id and current stage.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    stage: String,
}

impl RunLogger {
    /// New logger with a fresh run id.
    pub fn new(stage: &str) -> Self {
        Self::with_run_id(&Uuid::new_v4().to_string(), stage)
    }

    pub fn with_run_id(run_id: &str, stage: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            stage: stage.to_string(),
        }
    }

    /// Same run, different stage.
    pub fn stage(&self, stage: &str) -> Self {
        Self::with_run_id(&self.run_id, stage)
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, stage = %self.stage, "Stage started: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, stage = %self.stage, "{}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, stage = %self.stage, "{}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, stage = %self.stage, "Stage completed: {}", message);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage_name(&self) -> &str {
        &self.stage
    }

    /// Span for attaching the run id to nested work.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("reel_run", run_id = %self.run_id, stage = %self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunLogger::new("scrape");
        let b = RunLogger::new("scrape");
        assert_ne!(a.run_id(), b.run_id());
        assert!(Uuid::parse_str(a.run_id()).is_ok());
    }

    #[test]
    fn test_stage_keeps_run_id() {
        let logger = RunLogger::with_run_id("run-1", "scrape");
        let render = logger.stage("render");
        assert_eq!(render.run_id(), "run-1");
        assert_eq!(render.stage_name(), "render");
    }
}
