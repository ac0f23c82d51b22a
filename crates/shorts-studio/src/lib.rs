//! Generation orchestrator.
//!
//! This crate provides:
//! - Admission of a single active job and topic auto-selection
//! - Script generation followed by the concurrent media fan-out
//! - Result assembly and the confidence gate
//! - Failure classification and credential invalidation
//! - Progress events for front-end subscribers

pub mod config;
pub mod credential;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;

#[cfg(test)]
mod orchestrator_tests;

pub use config::StudioConfig;
pub use credential::CredentialState;
pub use error::{StudioError, StudioResult};
pub use logging::JobLogger;
pub use orchestrator::{Admission, GenerationRequest, Orchestrator};
