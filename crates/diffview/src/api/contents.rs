use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use diffview_core::Side;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ContentParams {
    pub path: String,
}

/// Raw content of one side of the change matching `path`.
///
/// Binary data never gets this far (it was replaced by a text message when
/// the change was materialized), so the body is always served as plain text.
pub async fn get_contents(
    State(state): State<AppState>,
    Path(side): Path<String>,
    Query(params): Query<ContentParams>,
) -> Result<Response, (StatusCode, String)> {
    let side: Side = side.parse().map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let change = state.store.get_by_path(&params.path).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("No change for path '{}'", params.path),
        )
    })?;

    let data = change
        .content(side)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("'{}' has no {} content", params.path, side),
            )
        })?
        .to_vec();

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        data,
    )
        .into_response())
}
