//! Shopify webhook receiver.
//!
//! Each delivery walks `received -> authenticated -> parsed -> mapped ->
//! revalidated`, or stops at a rejection. The complete raw body is consumed
//! before any signature work (axum's `Bytes` extractor buffers it), because
//! the HMAC is over the exact bytes Shopify sent. A missing signing secret
//! rejects every delivery outright: misconfiguration fails closed.

use std::collections::BTreeSet;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::pages::{HOME_PATH, product_path};
use crate::state::AppState;

/// Header carrying the base64-encoded HMAC-SHA256 of the raw body.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// Header naming the notification topic.
pub const TOPIC_HEADER: &str = "x-shopify-topic";

type HmacSha256 = Hmac<Sha256>;

/// Reasons a delivery is rejected. Each maps to a terminal response; a
/// rejected delivery is never partially processed.
#[derive(Debug, Error)]
pub enum WebhookRejection {
    /// No signing secret configured on the server.
    #[error("webhook not configured")]
    NotConfigured,

    /// Signature missing, malformed, or not matching the body.
    #[error("HMAC verification failed")]
    InvalidSignature,

    /// Verified body was not valid JSON.
    #[error("invalid JSON payload")]
    InvalidPayload,
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::InvalidPayload => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Success response: echoes the paths targeted for regeneration.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    pub revalidated: Vec<String>,
}

// =============================================================================
// Signature verification
// =============================================================================

/// Verify the HMAC signature over the exact raw request body.
///
/// The header value is base64-decoded and compared against a fresh
/// HMAC-SHA256 of `body` keyed with `secret`. `verify_slice` rejects length
/// mismatches and compares in constant time; any malformed input fails
/// verification rather than erroring.
fn verify_signature(secret: &SecretString, headers: &HeaderMap, body: &[u8]) -> bool {
    let Some(header) = headers.get(HMAC_HEADER).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let Ok(provided) = base64::engine::general_purpose::STANDARD.decode(header) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

// =============================================================================
// Topic payloads
// =============================================================================

#[derive(Debug, Deserialize)]
struct ProductUpdatePayload {
    #[allow(dead_code)]
    id: u64,
    #[serde(default)]
    variants: Vec<VariantRef>,
}

#[derive(Debug, Deserialize)]
struct VariantRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct VariantUpdatePayload {
    id: u64,
}

/// Map a verified, parsed notification to the paths to regenerate.
///
/// Recognized topics contribute the slugs of every product whose variant
/// GIDs reference an id in the payload. The homepage is always included
/// since it surfaces variant data; unknown topics refresh it alone.
fn affected_paths(catalog: &Catalog, topic: &str, payload: &serde_json::Value) -> BTreeSet<String> {
    let mut slugs: BTreeSet<String> = BTreeSet::new();

    match topic {
        "products/update" => {
            if let Ok(product) = serde_json::from_value::<ProductUpdatePayload>(payload.clone()) {
                for variant in &product.variants {
                    slugs.extend(catalog.slugs_for_variant(&variant.id.to_string()));
                }
            }
        }
        "variants/update" => {
            if let Ok(variant) = serde_json::from_value::<VariantUpdatePayload>(payload.clone()) {
                slugs.extend(catalog.slugs_for_variant(&variant.id.to_string()));
            }
        }
        other => {
            tracing::debug!(topic = %other, "unhandled webhook topic");
        }
    }

    let mut paths: BTreeSet<String> = slugs.iter().map(|slug| product_path(slug)).collect();
    paths.insert(HOME_PATH.to_string());
    paths
}

// =============================================================================
// Handler
// =============================================================================

/// POST /api/shopify/webhook - receive a catalog-change notification.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookRejection> {
    let Some(secret) = state.config().shopify.webhook_secret.as_ref() else {
        tracing::error!("SHOPIFY_WEBHOOK_SECRET not configured, rejecting delivery");
        return Err(WebhookRejection::NotConfigured);
    };

    if !verify_signature(secret, &headers, &body) {
        tracing::warn!("webhook HMAC verification failed");
        return Err(WebhookRejection::InvalidSignature);
    }

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("webhook body is not valid JSON: {e}");
        WebhookRejection::InvalidPayload
    })?;

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let paths = affected_paths(state.catalog(), topic, &payload);

    let mut revalidated = Vec::with_capacity(paths.len());
    for path in paths {
        // Per-page isolation: one failed regeneration never aborts the rest
        if let Err(e) = state.pages().revalidate(&path, state.catalog()).await {
            tracing::error!(path = %path, "revalidation failed: {e}");
        }
        tracing::info!(path = %path, topic = %topic, "revalidated");
        revalidated.push(path);
    }

    Ok(Json(WebhookResponse {
        ok: true,
        revalidated,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use axum::http::HeaderValue;
    use merchdrop_core::VariantGid;
    use serde_json::json;

    use crate::catalog::{Catalog, OptionAssignment, Variant};
    use crate::config::{ShopifyConfig, StorefrontConfig};

    const TEST_SECRET: &str = "whsec_0123456789abcdef";

    fn test_state(with_secret: bool) -> AppState {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            shopify: ShopifyConfig {
                store: "test.myshopify.com".to_string(),
                api_version: "2024-10".to_string(),
                storefront_token: SecretString::from("token"),
                webhook_secret: with_secret.then(|| SecretString::from(TEST_SECRET)),
            },
            sentry_dsn: None,
        };
        AppState::new(config)
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    fn signed_headers(secret: &str, body: &[u8], topic: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HMAC_HEADER,
            HeaderValue::from_str(&sign(secret, body)).unwrap(),
        );
        headers.insert(TOPIC_HEADER, HeaderValue::from_str(topic).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_valid_delivery_revalidates_product_and_homepage() {
        let state = test_state(true);
        let body = json!({"id": 1, "variants": [{"id": 46_697_207_333_122_u64}]}).to_string();
        let headers = signed_headers(TEST_SECRET, body.as_bytes(), "products/update");

        let response = receive(State(state), headers, Bytes::from(body))
            .await
            .expect("accepted");

        assert!(response.0.ok);
        assert_eq!(
            response.0.revalidated,
            vec![
                "/".to_string(),
                "/products/twisted-love-black".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_variants_update_topic() {
        let state = test_state(true);
        let body = json!({"id": 46_697_207_464_194_u64}).to_string();
        let headers = signed_headers(TEST_SECRET, body.as_bytes(), "variants/update");

        let response = receive(State(state), headers, Bytes::from(body))
            .await
            .expect("accepted");

        assert_eq!(
            response.0.revalidated,
            vec![
                "/".to_string(),
                "/products/twisted-love-white".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_topic_refreshes_homepage_only() {
        let state = test_state(true);
        let body = json!({"id": 7}).to_string();
        let headers = signed_headers(TEST_SECRET, body.as_bytes(), "orders/create");

        let response = receive(State(state), headers, Bytes::from(body))
            .await
            .expect("accepted");

        assert_eq!(response.0.revalidated, vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let state = test_state(true);
        let body = json!({"id": 1}).to_string();
        let headers = signed_headers("a-different-secret", body.as_bytes(), "variants/update");

        let rejection = receive(State(state), headers, Bytes::from(body))
            .await
            .expect_err("rejected");
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_truncated_signature_rejected() {
        let state = test_state(true);
        let body = json!({"id": 1}).to_string();

        // Re-encode a truncated digest so the header is valid base64 of the
        // wrong length
        let digest = base64::engine::general_purpose::STANDARD
            .decode(sign(TEST_SECRET, body.as_bytes()))
            .unwrap();
        let truncated =
            base64::engine::general_purpose::STANDARD.encode(digest.get(..16).unwrap());

        let mut headers = HeaderMap::new();
        headers.insert(HMAC_HEADER, HeaderValue::from_str(&truncated).unwrap());

        let rejection = receive(State(state), headers, Bytes::from(body))
            .await
            .expect_err("rejected");
        assert!(matches!(rejection, WebhookRejection::InvalidSignature));
    }

    #[tokio::test]
    async fn test_malformed_signature_rejected() {
        let state = test_state(true);
        let body = json!({"id": 1}).to_string();

        let mut headers = HeaderMap::new();
        headers.insert(HMAC_HEADER, HeaderValue::from_static("%%not-base64%%"));

        let rejection = receive(State(state), headers, Bytes::from(body))
            .await
            .expect_err("rejected");
        assert!(matches!(rejection, WebhookRejection::InvalidSignature));
    }

    #[tokio::test]
    async fn test_missing_signature_rejected() {
        let state = test_state(true);
        let body = json!({"id": 1}).to_string();

        let rejection = receive(State(state), HeaderMap::new(), Bytes::from(body))
            .await
            .expect_err("rejected");
        assert!(matches!(rejection, WebhookRejection::InvalidSignature));
    }

    #[tokio::test]
    async fn test_missing_secret_fails_closed() {
        let state = test_state(false);
        let body = json!({"id": 1}).to_string();
        // Even a correctly-signed delivery is rejected without configuration
        let headers = signed_headers(TEST_SECRET, body.as_bytes(), "variants/update");

        let rejection = receive(State(state), headers, Bytes::from(body))
            .await
            .expect_err("rejected");
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_invalid_json_rejected_after_auth() {
        let state = test_state(true);
        let body = b"{not json".to_vec();
        let headers = signed_headers(TEST_SECRET, &body, "variants/update");

        let rejection = receive(State(state), headers, Bytes::from(body))
            .await
            .expect_err("rejected");
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_double_delivery_is_harmless() {
        let state = test_state(true);
        let body = json!({"id": 46_697_207_333_122_u64}).to_string();

        for _ in 0..2 {
            let headers = signed_headers(TEST_SECRET, body.as_bytes(), "variants/update");
            let response = receive(State(state.clone()), headers, Bytes::from(body.clone()))
                .await
                .expect("accepted");
            assert_eq!(
                response.0.revalidated,
                vec![
                    "/".to_string(),
                    "/products/twisted-love-black".to_string()
                ]
            );
        }
    }

    #[test]
    fn test_affected_paths_variant_shared_by_two_products() {
        let shared = VariantGid::new("gid://shopify/ProductVariant/42");
        let template = Catalog::builtin()
            .find_by_slug("collab-black")
            .unwrap()
            .clone();

        let mut a = template.clone();
        a.slug = "a".to_string();
        a.variants = vec![Variant {
            id: shared.clone(),
            assignments: vec![OptionAssignment {
                name: "Size".to_string(),
                value: "M".to_string(),
            }],
            price: None,
        }];
        let mut b = a.clone();
        b.slug = "b".to_string();

        let catalog = Catalog::new(vec![a, b]);
        let paths = affected_paths(&catalog, "variants/update", &json!({"id": 42}));

        let expected: BTreeSet<String> = ["/", "/products/a", "/products/b"]
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(paths, expected);
    }

    #[tokio::test]
    async fn test_non_post_method_not_allowed() {
        use tower::ServiceExt;

        let app = crate::routes::routes().with_state(test_state(true));
        let request = axum::http::Request::builder()
            .method("GET")
            .uri("/api/shopify/webhook")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
