#![warn(missing_docs)]
//! Prize collection persistence.
//!
//! The only persisted game state is the list of collected prize ids, stored as
//! JSON under [`COLLECTION_KEY`] in a flat key-value store.

mod error;
mod manager;
mod store;

pub use error::CollectionError;
pub use manager::{CollectionData, CollectionManager, COLLECTION_KEY};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
