use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use diffview_core::Snapshot;

use super::AppState;

pub async fn list_changes(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.store.all())
}

pub async fn get_change(
    State(state): State<AppState>,
    Path(idx): Path<usize>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let change = state
        .store
        .get_by_index(idx)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No change at index {}", idx)))?;

    let value = serde_json::to_value(change.as_ref())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(value))
}
