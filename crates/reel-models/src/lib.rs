//! Shared data models for the reel generator.
//!
//! This crate provides Serde-serializable types for:
//! - Scenes produced by script generation
//! - Timed captions and the caption style policy
//! - Render settings for the vertical output canvas
//! - The on-disk directory layout shared by every pipeline stage

pub mod caption;
pub mod encoding;
pub mod error;
pub mod paths;
pub mod scene;
pub mod timestamp;

// Re-export common types
pub use caption::{CaptionAlignment, CaptionStyle, TimedCaption};
pub use encoding::RenderSettings;
pub use error::{ModelError, ModelResult};
pub use paths::ReelPaths;
pub use scene::{Scene, Script};
