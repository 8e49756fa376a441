//! The client cart.
//!
//! [`CartStore`] owns the authoritative line list for one client session. It
//! is an explicit, injectable service: handlers load it from storage at the
//! start of a request, mutate it, and every mutation persists the full line
//! list back under a fixed key. Missing or corrupt storage rehydrates as an
//! empty cart; write failures are absorbed so a broken backend never blocks
//! the shopper.

pub mod storage;

use merchdrop_core::{CurrencyCode, LineId, Price, VariantGid};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use storage::{CART_STORAGE_KEY, CartStorage, MemoryStorage, SessionStorage, StorageError};

/// Lower quantity bound per line.
pub const MIN_QUANTITY: u32 = 1;
/// Upper quantity bound per line.
pub const MAX_QUANTITY: u32 = 99;

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Locally-generated row id; Shopify never sees it.
    pub id: LineId,
    #[serde(default)]
    pub slug: Option<String>,
    pub name: String,
    /// Unit price captured at add time, not re-fetched.
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Shopify variant GID; required before checkout can proceed.
    #[serde(default)]
    pub variant_id: Option<VariantGid>,
    #[serde(default)]
    pub preorder: bool,
    #[serde(default)]
    pub ship_estimate: Option<String>,
}

/// A line about to enter the cart; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub slug: Option<String>,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub size: Option<String>,
    pub image: Option<String>,
    pub variant_id: Option<VariantGid>,
    pub preorder: bool,
    pub ship_estimate: Option<String>,
}

/// The cart service for one client session.
#[derive(Debug)]
pub struct CartStore<S: CartStorage> {
    storage: S,
    lines: Vec<CartLine>,
    open: bool,
}

impl<S: CartStorage> CartStore<S> {
    /// Rehydrate the cart from storage.
    ///
    /// Missing or corrupt data yields an empty cart; this never fails.
    pub async fn load(storage: S) -> Self {
        let lines = match storage.get(CART_STORAGE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("discarding corrupt cart data: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("cart storage read failed: {e}");
                Vec::new()
            }
        };

        Self {
            storage,
            lines,
            open: false,
        }
    }

    /// Add a line, merging into an existing line with the same
    /// (variant id, size) pair.
    ///
    /// Opens the cart drawer as a side-effect signal to the presentation
    /// layer. Returns the id of the affected line.
    pub async fn add_item(&mut self, item: NewCartLine) -> LineId {
        let quantity = clamp_quantity(i64::from(item.quantity));

        let existing_index = item.variant_id.as_ref().and_then(|variant_id| {
            self.lines
                .iter()
                .position(|l| l.variant_id.as_ref() == Some(variant_id) && l.size == item.size)
        });

        let merged = existing_index
            .and_then(|index| self.lines.get_mut(index))
            .map(|line| {
                line.quantity = (line.quantity + quantity).min(MAX_QUANTITY);
                line.id
            });

        let id = match merged {
            Some(id) => id,
            None => {
                let id = LineId::generate();
                self.lines.push(CartLine {
                    id,
                    slug: item.slug,
                    name: item.name,
                    price: item.price,
                    quantity,
                    size: item.size,
                    image: item.image,
                    variant_id: item.variant_id,
                    preorder: item.preorder,
                    ship_estimate: item.ship_estimate,
                });
                id
            }
        };

        self.open = true;
        self.persist().await;
        id
    }

    /// Remove the line with the given id; no-op when absent.
    pub async fn remove_item(&mut self, id: LineId) {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        if self.lines.len() != before {
            self.persist().await;
        }
    }

    /// Set a line's quantity, clamped into `[MIN_QUANTITY, MAX_QUANTITY]`;
    /// no-op when the id is absent.
    pub async fn set_qty(&mut self, id: LineId, qty: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = clamp_quantity(qty);
            self.persist().await;
        }
    }

    /// Empty the cart.
    pub async fn clear(&mut self) {
        self.lines.clear();
        self.persist().await;
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total item count, recomputed on every call.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of price times quantity across lines, recomputed on every call.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let amount = self
            .lines
            .iter()
            .map(|l| l.price.amount * Decimal::from(l.quantity))
            .sum();
        let currency_code = self
            .lines
            .first()
            .map_or(CurrencyCode::USD, |l| l.price.currency_code);
        Price::new(amount, currency_code)
    }

    /// Whether the drawer should be open (set by `add_item`, cleared by
    /// `close`). Interaction state only; never persisted.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Close the drawer signal (e.g., on checkout handoff).
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Write the full line list to storage. Failures are logged and
    /// absorbed; the in-memory cart stays authoritative for this session.
    async fn persist(&self) {
        match serde_json::to_string(&self.lines) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(CART_STORAGE_KEY, raw).await {
                    tracing::warn!("cart storage write failed: {e}");
                }
            }
            Err(e) => tracing::warn!("cart serialization failed: {e}"),
        }
    }
}

fn clamp_quantity(qty: i64) -> u32 {
    let clamped = qty.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY));
    u32::try_from(clamped).unwrap_or(MIN_QUANTITY)
}
