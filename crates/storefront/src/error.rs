//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. Route handlers return
//! `Result<T, AppError>`; bodies are JSON `{"error": message}` banners.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::pages::PageError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Locally-recoverable validation failure (missing size, unresolvable
    /// variant). Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// Checkout refusal or remote commerce failure.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Page rendering failed.
    #[error("{0}")]
    Page(#[from] PageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body shown as a dismissible banner by the client.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Checkout(CheckoutError::Remote(_)) | Self::Page(PageError::Serialize(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_)
            | Self::Checkout(CheckoutError::EmptyCart | CheckoutError::MissingVariant) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Checkout(CheckoutError::Remote(_)) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_)
            | Self::Page(PageError::UnknownPath(_) | PageError::UnknownProduct(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Internal(_) | Self::Page(PageError::Serialize(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            // Remote commerce failures are deliberately shown to the shopper
            // as one combined message; they decide whether to retry.
            Self::Checkout(CheckoutError::Remote(e)) => format!("Checkout failed: {e}"),
            Self::Internal(_) | Self::Page(PageError::Serialize(_)) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
