//! Shopify Storefront API client implementation.
//!
//! One mutation, `cartCreate`, executed as a typed JSON GraphQL request over
//! `reqwest`. Every failure mode - transport, non-2xx status, top-level
//! GraphQL errors, in-band `userErrors`, missing `checkoutUrl` - maps to a
//! distinct [`ShopifyError`] variant so callers can surface one combined
//! message. Nothing is retried here.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ShopifyConfig;
use crate::shopify::ShopifyError;
use crate::shopify::types::{CartCreateInput, CheckoutSession};

const CART_CREATE_MUTATION: &str = "\
mutation CartCreate($input: CartInput) {
  cartCreate(input: $input) {
    cart { id checkoutUrl }
    userErrors { field message }
  }
}";

/// How much of an error response body to keep for diagnostics.
const ERROR_BODY_SNIPPET: usize = 200;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct GraphQLRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Serialize)]
struct CartCreateVariables {
    input: CartCreateInput,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQLErrorBody>,
}

#[derive(Deserialize)]
struct GraphQLErrorBody {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartCreateData {
    cart_create: CartCreatePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartCreatePayload {
    cart: Option<RemoteCart>,
    #[serde(default)]
    user_errors: Vec<RemoteUserError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteCart {
    id: String,
    checkout_url: Option<String>,
}

#[derive(Deserialize)]
struct RemoteUserError {
    #[allow(dead_code)]
    field: Option<Vec<String>>,
    message: String,
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token: config.storefront_token.expose_secret().to_string(),
            }),
        }
    }

    /// Create a remote cart and return its checkout session.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, GraphQL
    /// errors, user errors, or a response without a checkout URL.
    #[instrument(skip(self, input), fields(lines = input.lines.len()))]
    pub async fn cart_create(
        &self,
        input: CartCreateInput,
    ) -> Result<CheckoutSession, ShopifyError> {
        let request = GraphQLRequest {
            query: CART_CREATE_MUTATION,
            variables: CartCreateVariables { input },
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header("Shopify-Storefront-Private-Token", &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %snippet(&response_text),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status,
                body: snippet(&response_text),
            });
        }

        let parsed: GraphQLResponse<CartCreateData> = serde_json::from_str(&response_text)
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    body = %snippet(&response_text),
                    "Failed to parse Shopify GraphQL response"
                );
                ShopifyError::Parse(e)
            })?;

        extract_session(parsed)
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(ERROR_BODY_SNIPPET).collect()
}

/// Turn a parsed `cartCreate` response into a checkout session.
fn extract_session(
    response: GraphQLResponse<CartCreateData>,
) -> Result<CheckoutSession, ShopifyError> {
    if !response.errors.is_empty() {
        let message = response
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ShopifyError::GraphQL(message));
    }

    let payload = response
        .data
        .ok_or_else(|| ShopifyError::GraphQL("no data in response".to_string()))?
        .cart_create;

    if !payload.user_errors.is_empty() {
        let message = payload
            .user_errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ShopifyError::UserError(message));
    }

    let cart = payload.cart.ok_or(ShopifyError::MissingCheckoutUrl)?;
    let checkout_url = cart
        .checkout_url
        .filter(|url| !url.is_empty())
        .ok_or(ShopifyError::MissingCheckoutUrl)?;

    Ok(CheckoutSession {
        id: cart.id,
        checkout_url,
    })
}
