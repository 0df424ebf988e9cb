//! Storage backends and the cache-aware repository built on top of them.
//!
//! The system of record is a concrete implementation of
//! `missive_core::storage::MessageStore`, selected at compile time via
//! feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): HashMap-backed store, data lives for the process
//! - `sqlite`: SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with SQLite and Redis:
//! ```bash
//! cargo build -p missive --no-default-features --features sqlite,redis
//! ```

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "inmemory", feature = "sqlite"))]
compile_error!(
    "Features 'inmemory' and 'sqlite' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'sqlite' feature. \
    Example: cargo build -p missive --features sqlite"
);

mod cached;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cached::CachedMessageRepository;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
