//! Integration tests for merchdrop.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the storefront
//! cargo run -p merchdrop-storefront
//!
//! # Run integration tests
//! cargo test -p merchdrop-integration-tests -- --ignored
//! ```
//!
//! Tests target a running storefront at `STOREFRONT_BASE_URL`
//! (default `http://localhost:3000`). Webhook tests additionally need
//! `SHOPIFY_WEBHOOK_SECRET` to match the server's configuration.

/// Base URL for the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
