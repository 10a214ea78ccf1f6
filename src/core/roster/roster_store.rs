// Storage port for the roster documents.
//
// Every entity family (players, teams, compositions, applications,
// invitations) lives in its own document. A document is always loaded and
// written as a whole, so the port is deliberately small: load, save, and a
// closure-based read-modify-write that implementations must run under a
// per-document lock.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A whole-file document. `NAME` doubles as the file stem on disk and as the
/// lock key, so it must be unique per document type.
pub trait Document: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    const NAME: &'static str;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a document. A document that was never written is empty, not an error.
    async fn load<D: Document>(&self) -> Result<D, StoreError>;

    /// Overwrite a document in full.
    async fn save<D: Document>(&self, doc: &D) -> Result<(), StoreError>;

    /// Read-modify-write under the document's lock.
    ///
    /// The document is only written back when `edit` returns `Ok`; an `Err`
    /// leaves the stored copy untouched.
    async fn update<D, R, E, F>(&self, edit: F) -> Result<R, E>
    where
        D: Document,
        R: Send,
        E: From<StoreError> + Send,
        F: FnOnce(&mut D) -> Result<R, E> + Send;
}
