//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page payload (cached rendering)
//! GET  /products/{slug}        - Product page payload (cached rendering)
//!
//! # Cart
//! GET  /cart                   - Cart view
//! POST /cart/add               - Resolve a selection and add a line
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge payload
//!
//! # Checkout
//! POST /checkout               - Create the remote session, redirect to it
//!
//! # Webhooks
//! POST /api/shopify/webhook    - Shopify catalog-change notifications
//! ```

pub mod cart;
pub mod home;
pub mod products;
pub mod webhook;

use axum::{
    Router,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Cached page renderings
        .route("/", get(home::home))
        .route("/products/{slug}", get(products::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout handoff
        .route("/checkout", post(cart::checkout))
        // Webhook receiver
        .route("/api/shopify/webhook", post(webhook::receive))
}

/// Serve an already-serialized JSON page body.
pub(crate) fn cached_json(body: &str) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}
