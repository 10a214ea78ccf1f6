// In-memory DocumentStore for tests. Documents are kept as JSON values so
// they go through the same serde path as the file store.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::roster::{Document, DocumentStore, StoreError};

#[derive(Default)]
pub struct InMemoryDocumentStore {
    docs: DashMap<&'static str, serde_json::Value>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn load<D: Document>(&self) -> Result<D, StoreError> {
        match self.docs.get(D::NAME) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(D::default()),
        }
    }

    async fn save<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        self.docs.insert(D::NAME, serde_json::to_value(doc)?);
        Ok(())
    }

    async fn update<D, R, E, F>(&self, edit: F) -> Result<R, E>
    where
        D: Document,
        R: Send,
        E: From<StoreError> + Send,
        F: FnOnce(&mut D) -> Result<R, E> + Send,
    {
        // The entry guard holds the shard lock for the whole edit.
        let mut entry = self.docs.entry(D::NAME).or_insert(serde_json::Value::Null);
        let mut doc: D = if entry.is_null() {
            D::default()
        } else {
            serde_json::from_value(entry.clone()).map_err(StoreError::from)?
        };
        let out = edit(&mut doc)?;
        *entry = serde_json::to_value(&doc).map_err(StoreError::from)?;
        Ok(out)
    }
}
