//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Shopify owns checkout truth - the storefront only ever receives a
//!   redirect URL and never mutates the remote session afterwards
//! - The one mutation this storefront performs is `cartCreate`; the GraphQL
//!   request is hand-built typed JSON over `reqwest`
//!
//! # Example
//!
//! ```rust,ignore
//! use merchdrop_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify);
//! let session = client.cart_create(input).await?;
//! // hand the browser session.checkout_url
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use types::{AttributeInput, CartCreateInput, CartLineInput, CheckoutSession};

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from Shopify.
    #[error("Shopify HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// GraphQL query returned top-level errors.
    #[error("GraphQL errors: {0}")]
    GraphQL(String),

    /// Mutation-level user errors returned in-band (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The mutation succeeded but no checkout URL came back.
    #[error("no checkout URL in cart response")]
    MissingCheckoutUrl,
}
