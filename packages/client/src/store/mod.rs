//! Local key-value store for client-side flags.
//!
//! The only durable client state is the maintenance notice: the body the
//! server sent when it last reported maintenance mode. The UI reads it to
//! show a banner; the dispatcher clears it after the next normal response.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStore`] | Tests, short-lived processes |
//! | [`SqliteStore`] | Desktop or CLI hosts that want the flag to survive restarts |
//!
//! [`MemoryStore`]: memory::MemoryStore
//! [`SqliteStore`]: sqlite::SqliteStore

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

/// Key under which the maintenance notice is stored, as JSON text.
pub const MAINTENANCE_KEY: &str = "maintenance";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("internal store error: {0}")]
    Internal(String),
}

/// String-keyed, string-valued persistence.
///
/// Writes are last-writer-wins; there is no transaction across keys.
#[async_trait]
pub trait LocalStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
