//! Provider gateway contract.

use async_trait::async_trait;

use shorts_models::{MediaHandle, ScriptPackage, Thumbnail, ThumbnailVariant};

use crate::error::GatewayResult;

/// The four generative operations the orchestrator drives.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Script, publishing metadata, confidence and grounding citations for a topic.
    async fn generate_script(&self, topic: &str) -> GatewayResult<ScriptPackage>;

    /// One image per variant; variants that yield no image are omitted.
    async fn generate_thumbnails(
        &self,
        title: &str,
        variants: &[ThumbnailVariant],
    ) -> GatewayResult<Vec<Thumbnail>>;

    /// Long-running video generation, polled to completion and materialized locally.
    async fn generate_video(&self, script: &str) -> GatewayResult<MediaHandle>;

    /// Spoken voice-over for the script.
    async fn generate_voiceover(&self, script: &str) -> GatewayResult<MediaHandle>;
}
