//! Domain types for the Shopify Storefront API.
//!
//! The input types serialize directly into `cartCreate` variables, so their
//! field names follow Shopify's camelCase wire format.

use serde::Serialize;

/// Input for the `cartCreate` mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCreateInput {
    pub lines: Vec<CartLineInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeInput>,
}

/// One line of a remote cart: a variant, a quantity, and opaque metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Shopify variant GID.
    pub merchandise_id: String,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeInput>,
}

/// An opaque key/value attribute attached to a line or cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeInput {
    pub key: String,
    pub value: String,
}

impl AttributeInput {
    /// Build an attribute pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The slice of a remote checkout session this storefront holds.
///
/// Shopify owns the rest; after creation the local system can only redirect
/// to `checkout_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub checkout_url: String,
}
