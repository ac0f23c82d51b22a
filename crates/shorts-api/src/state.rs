//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use shorts_gemini::{ApiKeyStore, GatewayResult, GeminiClient, GeminiConfig};
use shorts_studio::{CredentialState, Orchestrator, StudioConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orchestrator: Arc<Orchestrator>,
    pub keys: Arc<ApiKeyStore>,
    pub credential: CredentialState,
    /// Directory served under /media
    pub media_dir: PathBuf,
}

impl AppState {
    /// Wire the Gemini client into a new orchestrator.
    ///
    /// A key supplied through the environment counts as selected.
    pub fn new(config: ApiConfig, gemini: GeminiConfig, studio: StudioConfig) -> GatewayResult<Self> {
        let keys = Arc::new(ApiKeyStore::new(gemini.api_key.clone()));
        let credential = CredentialState::new(gemini.api_key.is_some());
        let media_dir = gemini.media_dir.clone();

        let client = GeminiClient::new(gemini, Arc::clone(&keys))?;
        let orchestrator = Orchestrator::new(Arc::new(client), studio, credential.clone());

        Ok(Self::from_parts(config, Arc::new(orchestrator), keys, media_dir))
    }

    /// Assemble state around an existing orchestrator.
    pub fn from_parts(
        config: ApiConfig,
        orchestrator: Arc<Orchestrator>,
        keys: Arc<ApiKeyStore>,
        media_dir: PathBuf,
    ) -> Self {
        let credential = orchestrator.credential().clone();
        Self {
            config,
            orchestrator,
            keys,
            credential,
            media_dir,
        }
    }
}
