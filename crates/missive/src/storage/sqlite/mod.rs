//! SQLite storage backend implementation.
//!
//! Uses `rusqlite` for the synchronous driver and `tokio-rusqlite` to run
//! every statement on a dedicated connection thread.

mod conversions;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;
