//! News article to vertical reel generator.
//!
//! This crate provides:
//! - Environment configuration
//! - HTTP collaborators for scraping, scripting, images and narration
//! - The stage-by-stage reel generator

pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod retry;
pub mod services;

pub use config::ReelConfig;
pub use error::{WorkerError, WorkerResult};
pub use generator::{Collaborators, ReelGenerator, ReelOutcome};
pub use logging::RunLogger;
