//! In-memory [`CallStore`] for tests and embedding.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::IvrError;
use crate::models::CallTable;

use super::CallStore;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    table: RwLock<CallTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: CallTable) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }

    fn snapshot(&self) -> CallTable {
        // A poisoned lock still holds the last fully persisted table
        match self.table.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl CallStore for InMemoryStore {
    async fn load(&self) -> Result<CallTable, IvrError> {
        Ok(self.snapshot())
    }

    async fn persist(&self, table: &CallTable) -> Result<(), IvrError> {
        let mut guard = match self.table.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = table.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::call::sample;

    #[tokio::test]
    async fn test_starts_empty() {
        let store = InMemoryStore::new();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_replaces_everything() {
        let store =
            InMemoryStore::with_table(CallTable::from_records(vec![sample(1), sample(2)]).unwrap());

        let replacement = CallTable::from_records(vec![sample(3)]).unwrap();
        store.persist(&replacement).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, replacement);
        assert!(!loaded.contains(1));
    }

    #[tokio::test]
    async fn test_loaded_table_is_a_copy() {
        let store = InMemoryStore::with_table(CallTable::from_records(vec![sample(1)]).unwrap());
        let mut table = store.load().await.unwrap();
        table.remove(1);
        assert!(store.load().await.unwrap().contains(1));
    }
}
