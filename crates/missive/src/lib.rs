//! Cache-coherent message store.
//!
//! Messages are read through a per-operation identity map and a shared
//! distributed cache before falling back to the system of record, and every
//! committed change is announced on an event bus.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod identity_map;
pub mod service;
pub mod state;
pub mod storage;
pub mod unit_of_work;

#[cfg(test)]
mod test_support;
