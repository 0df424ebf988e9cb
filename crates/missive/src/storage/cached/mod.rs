//! Cache-aware repository over the system of record.
//!
//! Reads go through the multi-level cache (cache-aside); writes invalidate
//! both tiers, persist, then repopulate them with the persisted snapshot.

mod repository;

pub use repository::CachedMessageRepository;
