//! Product page route handlers.

use axum::extract::{Path, State};
use axum::response::Response;
use tracing::instrument;

use crate::error::Result;
use crate::pages::product_path;
use crate::routes::cached_json;
use crate::state::AppState;

/// Serve a product page rendering from the page cache.
#[instrument(skip(state), fields(slug = %slug))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let body = state
        .pages()
        .page(&product_path(&slug), state.catalog())
        .await?;
    Ok(cached_json(&body))
}
