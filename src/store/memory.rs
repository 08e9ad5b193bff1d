//! In-memory snapshot store (for tests).

use std::sync::Mutex;

use async_trait::async_trait;

use super::{PersistedState, StateStore};
use crate::error::StoreError;

/// Holds the snapshot in memory; same contract as the file store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Option<PersistedState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, as if a previous process had persisted this.
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        Ok(self.state.lock().expect("store mutex poisoned").clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        *self.state.lock().expect("store mutex poisoned") = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.state.lock().expect("store mutex poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn empty_then_save_then_clear() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        let state = PersistedState {
            address: "a@tmp.test".into(),
            session_id: "em_2".into(),
            created_at: Utc::now(),
            last_seen_id: None,
            messages: Vec::new(),
        };
        store.save(&state).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().session_id, "em_2");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
