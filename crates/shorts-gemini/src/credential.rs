//! Runtime-replaceable API key.

use tokio::sync::RwLock;

use crate::error::{GatewayError, GatewayResult};

/// Holds the API key used for every provider request.
///
/// The key is read per request so that selecting a new credential takes
/// effect without rebuilding the client.
#[derive(Debug, Default)]
pub struct ApiKeyStore {
    key: RwLock<Option<String>>,
}

impl ApiKeyStore {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: RwLock::new(key.as_deref().and_then(normalize)),
        }
    }

    /// Current key, or a credential error when none is configured.
    pub async fn get(&self) -> GatewayResult<String> {
        self.key
            .read()
            .await
            .clone()
            .ok_or_else(|| GatewayError::credential("No API key configured"))
    }

    /// Replace the key. A blank key leaves the store unconfigured.
    pub async fn set(&self, key: impl Into<String>) {
        let key = key.into();
        *self.key.write().await = normalize(&key);
    }

    pub async fn clear(&self) {
        *self.key.write().await = None;
    }

    pub async fn is_configured(&self) -> bool {
        self.key.read().await.is_some()
    }
}

fn normalize(key: &str) -> Option<String> {
    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}
