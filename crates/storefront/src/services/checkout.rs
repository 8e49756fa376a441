//! Checkout initiation.
//!
//! [`CheckoutInitiator`] validates the local cart and exchanges it for a
//! hosted checkout session. Two rules are load-bearing:
//!
//! - Hard gate: a line without a variant id refuses checkout locally; the
//!   gateway is never called.
//! - At-most-one-in-flight: while a remote call is outstanding, further
//!   invocations are no-ops, so repeated clicks cannot double-submit.
//!
//! On success the local cart is intentionally left intact - Shopify owns
//! line-item truth once the shopper is redirected.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::cart::CartLine;
use crate::shopify::types::{AttributeInput, CartCreateInput, CartLineInput, CheckoutSession};
use crate::shopify::{ShopifyError, StorefrontClient};

/// Errors refusing or failing a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// At least one line has no variant id; refused before any network call.
    #[error("One or more items are missing a Shopify variant. Please re-add the item.")]
    MissingVariant,

    /// The remote call failed; surfaced as a single combined message.
    #[error("{0}")]
    Remote(#[from] ShopifyError),
}

/// The remote side of checkout, behind a seam so the gate and re-entrancy
/// guard are testable without a network.
pub trait CheckoutGateway: Send + Sync {
    /// Create a remote cart from the given input and return its session.
    fn create_cart(
        &self,
        input: CartCreateInput,
    ) -> impl Future<Output = Result<CheckoutSession, ShopifyError>> + Send;
}

impl CheckoutGateway for StorefrontClient {
    async fn create_cart(&self, input: CartCreateInput) -> Result<CheckoutSession, ShopifyError> {
        self.cart_create(input).await
    }
}

/// Orchestrates the checkout handoff for one storefront process.
pub struct CheckoutInitiator<G: CheckoutGateway> {
    gateway: G,
    in_flight: AtomicBool,
}

impl<G: CheckoutGateway> CheckoutInitiator<G> {
    /// Wrap a gateway.
    pub const fn new(gateway: G) -> Self {
        Self {
            gateway,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a checkout call is currently outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate the cart and create a remote checkout session.
    ///
    /// Returns `Ok(None)` when another invocation is already in flight (the
    /// no-op double-submission guard). The caller's cart is never mutated
    /// here, success or failure.
    ///
    /// # Errors
    ///
    /// `EmptyCart` / `MissingVariant` are local refusals made before the
    /// gateway is touched; `Remote` wraps any gateway failure.
    pub async fn begin(&self, lines: &[CartLine]) -> Result<Option<CheckoutSession>, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if lines.iter().any(|line| line.variant_id.is_none()) {
            return Err(CheckoutError::MissingVariant);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(None);
        }
        let _reset = InFlightReset(&self.in_flight);

        let session = self.gateway.create_cart(build_cart_input(lines)).await?;
        Ok(Some(session))
    }
}

/// Releases the in-flight flag on every completion path.
struct InFlightReset<'a>(&'a AtomicBool);

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Assemble the `cartCreate` input from validated cart lines.
///
/// Preorder flag, ship estimate, and size ride along as opaque line
/// attributes; the cart itself is tagged as a preorder order.
fn build_cart_input(lines: &[CartLine]) -> CartCreateInput {
    let lines = lines
        .iter()
        .map(|line| {
            let mut attributes = vec![AttributeInput::new("preorder", line.preorder.to_string())];
            if let Some(estimate) = line.ship_estimate.as_deref().filter(|s| !s.is_empty()) {
                attributes.push(AttributeInput::new("ship_estimate", estimate));
            }
            if let Some(size) = line.size.as_deref().filter(|s| !s.is_empty()) {
                attributes.push(AttributeInput::new("size", size));
            }

            CartLineInput {
                merchandise_id: line
                    .variant_id
                    .as_ref()
                    .map(|v| v.as_str().to_string())
                    .unwrap_or_default(),
                quantity: i64::from(line.quantity),
                attributes,
            }
        })
        .collect();

    CartCreateInput {
        lines,
        attributes: vec![AttributeInput::new("order_type", "preorder")],
    }
}
