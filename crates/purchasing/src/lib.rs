//! Purchasing domain module (purchase orders).
//!
//! This crate contains business rules for purchase orders: the status state machine,
//! the editing policy and the order total calculator. It performs no IO; the stock
//! side effect of a delivery is carried out by `stockkeep-infra`.

pub mod detail;
pub mod order;
pub mod status;
pub mod totals;

pub use detail::{OrderDetail, OrderLine};
pub use order::{OrderHeader, PurchaseOrder, StatusChange};
pub use status::PurchaseOrderStatus;
pub use totals::{line_total, OrderTotals, PricedLine};
