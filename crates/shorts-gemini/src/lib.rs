//! Gemini provider gateway.
//!
//! This crate provides:
//! - The `ProviderGateway` trait the orchestrator depends on
//! - A REST client for script, thumbnail, video and voice-over generation
//! - Long-running operation polling with an injectable sleeper
//! - Gateway-level error classification (credential, parse, provider, empty)

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod poll;
pub mod prompts;
pub mod types;
pub mod wav;


pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use credential::ApiKeyStore;
pub use error::{GatewayError, GatewayResult};
pub use gateway::ProviderGateway;
pub use poll::{PollPolicy, Sleeper, TokioSleeper};
