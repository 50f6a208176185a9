//! `stockkeep-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod validate;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    CategoryId, OrderDetailId, ProductId, PurchaseOrderId, SupplierId, TransactionId, UserId,
};
pub use version::{ExpectedVersion, Versioned};
