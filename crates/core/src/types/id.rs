//! Newtype IDs for type-safe entity references.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Locally-generated identifier for a single cart line.
///
/// Line ids exist only on this side of the checkout boundary; Shopify never
/// sees them. A fresh id is assigned whenever a line is appended to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    /// Generate a fresh random line id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LineId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Shopify product variant GID (e.g. `gid://shopify/ProductVariant/46697207333122`).
///
/// Webhook payloads reference variants by their numeric REST id rather than
/// the full GID, so [`VariantGid::legacy_id`] exposes the trailing numeric
/// segment for reverse lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantGid(String);

impl VariantGid {
    /// Wrap a GID string.
    #[must_use]
    pub fn new(gid: impl Into<String>) -> Self {
        Self(gid.into())
    }

    /// The full GID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric id after the last path segment, if the GID ends in one.
    #[must_use]
    pub fn legacy_id(&self) -> Option<u64> {
        self.0.rsplit('/').next()?.parse().ok()
    }

    /// Whether this GID refers to `reference`, given either as a full GID or
    /// as a bare numeric id.
    #[must_use]
    pub fn matches(&self, reference: &str) -> bool {
        if self.0 == reference {
            return true;
        }
        match (self.legacy_id(), reference.parse::<u64>()) {
            (Some(own), Ok(other)) => own == other,
            _ => false,
        }
    }
}

impl std::fmt::Display for VariantGid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VariantGid {
    fn from(gid: String) -> Self {
        Self(gid)
    }
}

impl From<&str> for VariantGid {
    fn from(gid: &str) -> Self {
        Self(gid.to_string())
    }
}
