//! Cart and checkout route handlers.
//!
//! Each handler rehydrates the session's cart store, applies one mutation,
//! and answers with the fresh cart view; the store itself persists on every
//! mutation. Checkout hands the browser off to Shopify's hosted checkout and
//! deliberately leaves the local cart intact.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use merchdrop_core::{LineId, Price};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartStore, CartStorage, NewCartLine, SessionStorage};
use crate::catalog::{SIZE_OPTION, resolver};
use crate::error::{AppError, Result};
use crate::state::AppState;

// =============================================================================
// Request bodies
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub slug: String,
    pub size: Option<String>,
    pub quantity: Option<u32>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: LineId,
    pub quantity: i64,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub line_id: LineId,
}

// =============================================================================
// Views
// =============================================================================

/// Cart line display data.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
    pub preorder: bool,
    pub ship_estimate: Option<String>,
    pub variant_id: Option<String>,
    pub image: Option<String>,
}

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub count: u32,
    pub subtotal: String,
    pub open: bool,
}

/// Cart count badge data.
#[derive(Debug, Serialize)]
pub struct CartCountView {
    pub count: u32,
}

impl CartView {
    fn from_store<S: CartStorage>(store: &CartStore<S>) -> Self {
        let items = store
            .lines()
            .iter()
            .map(|line| CartLineView {
                id: line.id.to_string(),
                slug: line.slug.clone(),
                name: line.name.clone(),
                size: line.size.clone(),
                quantity: line.quantity,
                unit_price: line.price.display(),
                line_price: Price::new(
                    line.price.amount * rust_decimal::Decimal::from(line.quantity),
                    line.price.currency_code,
                )
                .display(),
                preorder: line.preorder,
                ship_estimate: line.ship_estimate.clone(),
                variant_id: line.variant_id.as_ref().map(ToString::to_string),
                image: line.image.clone(),
            })
            .collect();

        Self {
            items,
            count: store.count(),
            subtotal: store.subtotal().display(),
            open: store.is_open(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = CartStore::load(SessionStorage::new(session)).await;
    Json(CartView::from_store(&cart))
}

/// Resolve a product/size selection and add it to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state
        .catalog()
        .find_by_slug(&form.slug)
        .ok_or_else(|| AppError::NotFound(format!("product: {}", form.slug)))?;

    let Some(size) = form.size.as_deref().filter(|s| !s.trim().is_empty()) else {
        return Err(AppError::Validation("Select a size first.".to_string()));
    };

    let selections = vec![(SIZE_OPTION.to_string(), size.to_string())];
    let Some(resolved) = resolver::resolve(product, &selections) else {
        return Err(AppError::Validation(
            "This size is unavailable right now.".to_string(),
        ));
    };

    let name = product.color.as_ref().map_or_else(
        || product.name.clone(),
        |color| format!("{} ({color})", product.name),
    );

    let mut cart = CartStore::load(SessionStorage::new(session)).await;
    cart.add_item(NewCartLine {
        slug: Some(product.slug.clone()),
        name,
        price: resolved.price,
        quantity: form.quantity.unwrap_or(1),
        size: resolved.size.clone(),
        image: Some(product.images.front.clone()),
        variant_id: Some(resolved.variant.id.clone()),
        preorder: product.preorder,
        ship_estimate: product.ship_estimate.clone(),
    })
    .await;

    Ok(Json(CartView::from_store(&cart)))
}

/// Set a line's quantity.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(form): Json<UpdateCartRequest>,
) -> Json<CartView> {
    let mut cart = CartStore::load(SessionStorage::new(session)).await;
    cart.set_qty(form.line_id, form.quantity).await;
    Json(CartView::from_store(&cart))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(form): Json<RemoveFromCartRequest>,
) -> Json<CartView> {
    let mut cart = CartStore::load(SessionStorage::new(session)).await;
    cart.remove_item(form.line_id).await;
    Json(CartView::from_store(&cart))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Json<CartView> {
    let mut cart = CartStore::load(SessionStorage::new(session)).await;
    cart.clear().await;
    Json(CartView::from_store(&cart))
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCountView> {
    let cart = CartStore::load(SessionStorage::new(session)).await;
    Json(CartCountView {
        count: cart.count(),
    })
}

/// Create the remote checkout session and hand the browser off to it.
///
/// The local cart is left intact on success; Shopify owns line-item truth
/// once the shopper is redirected. A second submission while one is in
/// flight answers 202 and makes no remote call.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut cart = CartStore::load(SessionStorage::new(session)).await;

    match state.checkout().begin(cart.lines()).await? {
        Some(checkout_session) => {
            cart.close();
            Ok(Redirect::to(&checkout_session.checkout_url).into_response())
        }
        None => Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({"message": "Checkout already in progress."})),
        )
            .into_response()),
    }
}
