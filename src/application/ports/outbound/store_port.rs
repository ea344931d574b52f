//! Key-value store port - Interface for the per-group persistent table

use async_trait::async_trait;

use crate::domain::entities::Group;
use crate::domain::errors::CommandError;

/// Failures from the store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The group has no store file configured.
    #[error("no key-value store configured for this group")]
    Unconfigured,

    #[error("store file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for CommandError {
    fn from(_: StoreError) -> Self {
        // Both cases mean the caller's data is unreachable right now.
        CommandError::StorageUnavailable
    }
}

/// Per-group persistent key-value table.
///
/// Implementations serialize all access to one group's table; concurrent
/// operations on different groups proceed independently.
#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    /// Read one key; `Ok(None)` when absent.
    async fn get(&self, group: &Group, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace one key.
    async fn set(&self, group: &Group, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove one key; absent keys are a no-op.
    async fn delete(&self, group: &Group, key: &str) -> Result<(), StoreError>;
}
