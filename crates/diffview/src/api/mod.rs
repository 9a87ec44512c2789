mod changes;
mod contents;
mod index;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Notify;
use tower_http::cors::CorsLayer;

use diffview_core::ChangeStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChangeStore>,
    pub shutdown: Arc<Notify>,
}

pub fn create_router(store: Arc<ChangeStore>, shutdown: Arc<Notify>) -> Router {
    let state = AppState { store, shutdown };

    Router::new()
        .route("/", get(index::index_page))
        .route("/api/changes", get(changes::list_changes))
        .route("/api/changes/{idx}", get(changes::get_change))
        .route("/api/contents/{side}", get(contents::get_contents))
        .route("/api/kill", post(kill))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn kill(axum::extract::State(state): axum::extract::State<AppState>) -> StatusCode {
    tracing::info!("Shutdown requested over HTTP");
    state.shutdown.notify_one();
    StatusCode::ACCEPTED
}
