//! In-memory storage backend.
//!
//! Stores message rows in a HashMap wrapped in `Arc<RwLock<_>>`. Useful for
//! tests and for running the binary without a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use missive::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! ```

mod store;

pub use store::InMemoryStore;
