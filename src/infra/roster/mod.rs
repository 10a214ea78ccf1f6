// Roster storage.
// - `json_store.rs` keeps one JSON file per document on disk.
// - `in_memory.rs` backs the domain tests.

#[path = "json_store.rs"]
pub mod json_store;

#[cfg(test)]
#[path = "in_memory.rs"]
pub mod in_memory;

pub use json_store::JsonDocumentStore;

#[cfg(test)]
pub use in_memory::InMemoryDocumentStore;
