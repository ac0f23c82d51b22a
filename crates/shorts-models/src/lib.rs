//! Shared data models for the ShortsStudio generation pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - The single live generation job and its phase state machine
//! - Script packages and grounding sources returned by the provider
//! - Media handles (video, voice-over, thumbnail variants)
//! - The assembled generation result and report
//! - Failure taxonomy and progress events

pub mod error;
pub mod event;
pub mod job;
pub mod job_phase;
pub mod media;
pub mod result;
pub mod script;
pub mod theme;

// Re-export common types
pub use error::{FailureKind, JobFailure, TransitionError};
pub use event::JobEvent;
pub use job::{Job, JobId};
pub use job_phase::JobPhase;
pub use media::{MediaBundle, MediaHandle, Thumbnail, ThumbnailVariant};
pub use result::{GenerationResult, Report, VideoMetadata};
pub use script::{EndScreenConfig, GroundingSource, ScriptPackage};
pub use theme::ThemeCatalog;
