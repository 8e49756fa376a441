//! Durable key-value storage behind the cart.
//!
//! The cart store never talks to a backend directly; it goes through
//! [`CartStorage`], a get/set/clear interface small enough to fake in tests.
//! Production uses [`SessionStorage`], which keeps the serialized cart in the
//! client's session, so it is durable per browser/device like the
//! `localStorage` it stands in for.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tower_sessions::Session;

/// Fixed storage key for the serialized cart line list.
pub const CART_STORAGE_KEY: &str = "cart-v1";

/// Errors from the storage backend.
///
/// Callers absorb these: a failed read means an empty cart, a failed write
/// means the cart keeps operating in memory for the session.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key-value storage for cart persistence.
pub trait CartStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove the value stored under `key`.
    fn clear(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

// =============================================================================
// Session-backed storage
// =============================================================================

/// Cart storage in the client's tower-sessions session.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    /// Wrap a request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.session
            .get::<String>(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.session
            .insert(key, value)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.session
            .remove::<String>(key)
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

/// In-memory cart storage, for tests and ephemeral use.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}
