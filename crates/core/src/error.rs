//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable at the call boundary: an operation that returns one of
/// these has left stock, order status and totals exactly as they were before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive quantity, empty name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A movement would drive a product's stock below zero.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Purchase order status change not permitted from the current state.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Mutation attempted on a record that policy keeps read-only.
    #[error("edit not permitted: {0}")]
    EditNotPermitted(String),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Delete blocked because other records still reference the target.
    #[error("still referenced: {0}")]
    StillReferenced(String),

    /// Concurrent modification detected on a versioned row.
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// The underlying store failed; the unit of work was rolled back.
    #[error("store failure: {0}")]
    StoreFailure(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_stock(product_id: ProductId, requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            product_id,
            requested,
            available,
        }
    }

    pub fn invalid_transition(from: impl core::fmt::Display, to: impl core::fmt::Display) -> Self {
        Self::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn edit_not_permitted(msg: impl Into<String>) -> Self {
        Self::EditNotPermitted(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn still_referenced(msg: impl Into<String>) -> Self {
        Self::StillReferenced(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreFailure(msg.into())
    }

    /// Whether retrying the whole unit of work with fresh reads may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict(_))
    }
}
