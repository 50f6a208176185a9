//! Inventory domain module.
//!
//! This crate contains the business rules for manual stock movements and for the
//! arithmetic of the stock ledger, implemented purely as deterministic domain logic
//! (no IO, no storage). Persisting a movement is the job of `stockkeep-infra`.

pub mod history;
pub mod movement;
pub mod transaction;

pub use history::{HistoryEntry, HistoryIter, StockHistory};
pub use movement::{StockMovement, StockWindow};
pub use transaction::{InventoryTransaction, RecordTransaction, TransactionType};
