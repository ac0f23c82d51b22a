//! Theme catalog handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ThemesResponse {
    pub themes: Vec<String>,
}

/// List the themes a blank topic is drawn from.
pub async fn list_themes(State(state): State<AppState>) -> Json<ThemesResponse> {
    Json(ThemesResponse {
        themes: state.orchestrator.config().themes.as_slice().to_vec(),
    })
}
