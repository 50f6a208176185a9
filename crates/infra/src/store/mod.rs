//! Transactional store boundary.
//!
//! This module defines the persistence abstraction the ledger and services run
//! against, plus an in-memory implementation for tests, demos and embedding.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{FaultPoint, InMemoryStore, InMemoryScope};
pub use r#trait::{Store, StoreError, UnitOfWork};
