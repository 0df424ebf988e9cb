//! Domain model and collaborator contracts for the missive message store.
//!
//! Everything in this crate is free of I/O: the `Message` aggregate and its
//! events, the persistence shape used by stores and caches, and the traits
//! the shell crate implements for each backend.

pub mod cache;
pub mod events;
pub mod message;
pub mod storage;
