//! Persistence of the group aggregate as one JSON document per key.

mod error;
mod group_store;
mod kv;

pub use error::StoreError;
pub use group_store::GroupStore;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
