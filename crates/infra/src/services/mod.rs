//! Application services.
//!
//! Each service owns a [`Store`](crate::store::Store) handle and runs every
//! mutating operation as one unit of work via [`crate::unit_of_work::execute`], so a
//! failure at any step leaves the store exactly as it was. Conflicting concurrent
//! writes are retried per the service's [`RetryPolicy`](crate::unit_of_work::RetryPolicy).

pub mod catalog;
pub mod purchase_orders;
pub mod suppliers;
pub mod transactions;

pub use catalog::{CatalogService, DashboardSummary};
pub use purchase_orders::{
    CreatePurchaseOrder, EditPurchaseOrder, OrderUpdate, PurchaseOrderService,
    PurchaseOrderView, UpdateOrderStatus,
};
pub use suppliers::SupplierService;
pub use transactions::{
    EditReceipt, InventoryTransactionService, TransactionDetails, TransactionReceipt,
};
