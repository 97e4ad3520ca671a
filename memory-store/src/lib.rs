//! Concurrency-safe keyed store
//!
//! `KeyedStore` replaces ad-hoc shared maps with an explicit `put` / `get` /
//! `merge` interface. Each value sits behind its own `parking_lot::Mutex`
//! inside a `DashMap`, which gives at-most-one writer per key while writers on
//! distinct keys proceed independently.
//!
//! ```rust
//! use memory_store::KeyedStore;
//!
//! let sessions: KeyedStore<String, Vec<String>> = KeyedStore::new();
//! sessions.put("session-1".to_string(), Vec::new()).unwrap();
//! sessions.merge(&"session-1".to_string(), |chunks| chunks.push("chunk-a".to_string())).unwrap();
//! assert_eq!(sessions.get(&"session-1".to_string()).unwrap().len(), 1);
//! ```

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::KeyedStore;
