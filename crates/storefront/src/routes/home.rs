//! Home page route handler.

use axum::extract::State;
use axum::response::Response;
use tracing::instrument;

use crate::error::Result;
use crate::pages::HOME_PATH;
use crate::routes::cached_json;
use crate::state::AppState;

/// Serve the home page rendering from the page cache.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Response> {
    let body = state.pages().page(HOME_PATH, state.catalog()).await?;
    Ok(cached_json(&body))
}
