//! Credential selection handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const MAX_KEY_LENGTH: usize = 256;

/// Credential selection request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCredentialRequest {
    /// New key; omit to re-confirm the key already configured
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Credential status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
    /// A key is stored on the server
    pub configured: bool,
    /// The key has not been rejected since it was selected
    pub valid: bool,
}

async fn credential_status(state: &AppState) -> CredentialResponse {
    CredentialResponse {
        configured: state.keys.is_configured().await,
        valid: state.credential.is_known_valid(),
    }
}

/// Report whether a usable credential is selected.
pub async fn get_credential(State(state): State<AppState>) -> Json<CredentialResponse> {
    Json(credential_status(&state).await)
}

/// Select a credential, optionally replacing the stored key.
pub async fn select_credential(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<CredentialResponse>> {
    let request: SelectCredentialRequest = if body.is_empty() {
        SelectCredentialRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid credential request: {}", e)))?
    };

    match request.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            if key.len() > MAX_KEY_LENGTH || key.chars().any(char::is_whitespace) {
                return Err(ApiError::bad_request("API key is malformed"));
            }
            state.keys.set(key).await;
            info!("New API key selected");
        }
        _ => {
            if !state.keys.is_configured().await {
                return Err(ApiError::bad_request("No API key provided"));
            }
            info!("Existing API key re-selected");
        }
    }

    state.credential.mark_valid();
    Ok(Json(credential_status(&state).await))
}
