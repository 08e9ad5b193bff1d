//! Persistence layer — session snapshot storage across restarts.

pub mod json;
pub mod memory;
pub mod snapshot;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use snapshot::PersistedState;

use async_trait::async_trait;

use crate::error::StoreError;

/// Durable storage for the single session snapshot.
///
/// Writes for the snapshot are observed in program order by later reads in
/// the same process. All fields are written and cleared as one unit.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted snapshot, if any.
    async fn load(&self) -> Result<Option<PersistedState>, StoreError>;

    /// Replace the persisted snapshot.
    async fn save(&self, state: &PersistedState) -> Result<(), StoreError>;

    /// Remove any persisted snapshot. Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<(), StoreError>;
}
