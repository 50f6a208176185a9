use thiserror::Error;

use stockkeep_core::{
    CategoryId, DomainError, ExpectedVersion, ProductId, PurchaseOrderId, SupplierId,
    TransactionId,
};
use stockkeep_inventory::InventoryTransaction;
use stockkeep_parties::Supplier;
use stockkeep_products::{Category, Product};
use stockkeep_purchasing::{OrderDetail, PurchaseOrder};

/// Store operation error.
///
/// These are **infrastructure errors** (missing rows, version conflicts, backend
/// failures) as opposed to domain errors (validation, invariants). They convert into
/// [`DomainError`] at the service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// Delete refused because other rows still point at the target.
    #[error("row still referenced: {0}")]
    Referenced(String),

    /// Duplicate key or dangling foreign key on insert.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::Conflict(msg) => DomainError::ConcurrencyConflict(msg),
            StoreError::Referenced(msg) => DomainError::StillReferenced(msg),
            StoreError::Constraint(msg) => DomainError::StoreFailure(msg),
            StoreError::Backend(msg) => DomainError::StoreFailure(msg),
        }
    }
}

/// Transactional store: hands out units of work.
///
/// ## Unit of work semantics
///
/// - Reads inside a scope observe the committed state as of `begin()` plus the
///   scope's own writes.
/// - Writes are invisible to other scopes until `commit()`, and then become visible
///   all at once.
/// - `rollback()` (or dropping the scope) discards every write.
/// - Versioned rows (products, purchase orders) are written with an
///   [`ExpectedVersion`]; a stale expectation is a [`StoreError::Conflict`], either
///   immediately or at commit time.
pub trait Store: Send + Sync {
    type Scope<'a>: UnitOfWork
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Scope<'_>, StoreError>;
}

/// One all-or-nothing scope of reads and writes.
pub trait UnitOfWork {
    // --- products ---
    fn get_product(&self, id: ProductId) -> Result<Product, StoreError>;
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    fn insert_product(&mut self, product: Product) -> Result<(), StoreError>;
    /// Replace a product row; returns the new version.
    fn update_product(
        &mut self,
        product: Product,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;
    /// Set a product's stock; returns the new version.
    fn update_product_stock(
        &mut self,
        id: ProductId,
        new_stock: i64,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;
    fn delete_product(&mut self, id: ProductId) -> Result<(), StoreError>;

    // --- categories ---
    fn get_category(&self, id: CategoryId) -> Result<Category, StoreError>;
    fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    fn upsert_category(&mut self, category: Category) -> Result<(), StoreError>;
    fn delete_category(&mut self, id: CategoryId) -> Result<(), StoreError>;

    // --- suppliers ---
    fn get_supplier(&self, id: SupplierId) -> Result<Supplier, StoreError>;
    fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError>;
    fn upsert_supplier(&mut self, supplier: Supplier) -> Result<(), StoreError>;
    fn delete_supplier(&mut self, id: SupplierId) -> Result<(), StoreError>;

    // --- reference lookups ---
    fn products_in_category(&self, id: CategoryId) -> Result<Vec<Product>, StoreError>;
    fn products_of_supplier(&self, id: SupplierId) -> Result<Vec<Product>, StoreError>;
    fn orders_of_supplier(&self, id: SupplierId) -> Result<Vec<PurchaseOrder>, StoreError>;
    /// All transactions for a product, in insertion order.
    fn transactions_for_product(
        &self,
        id: ProductId,
    ) -> Result<Vec<InventoryTransaction>, StoreError>;
    fn details_for_product(&self, id: ProductId) -> Result<Vec<OrderDetail>, StoreError>;

    // --- inventory transactions ---
    fn get_transaction(&self, id: TransactionId) -> Result<InventoryTransaction, StoreError>;
    /// Append a transaction; the returned copy carries its insertion sequence.
    fn insert_inventory_transaction(
        &mut self,
        transaction: InventoryTransaction,
    ) -> Result<InventoryTransaction, StoreError>;
    fn update_inventory_transaction(
        &mut self,
        transaction: InventoryTransaction,
    ) -> Result<(), StoreError>;

    // --- purchase orders ---
    fn get_order(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, StoreError>;
    fn list_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError>;
    fn insert_order(&mut self, order: PurchaseOrder) -> Result<(), StoreError>;
    /// Replace an order row; returns the new version.
    fn update_order(
        &mut self,
        order: PurchaseOrder,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;
    fn delete_order(
        &mut self,
        id: PurchaseOrderId,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError>;
    /// Detail rows of an order, in insertion order.
    fn order_details(&self, id: PurchaseOrderId) -> Result<Vec<OrderDetail>, StoreError>;
    fn insert_order_detail(&mut self, detail: OrderDetail) -> Result<(), StoreError>;
    /// Remove every detail row of an order; returns how many were removed.
    fn delete_order_details(&mut self, id: PurchaseOrderId) -> Result<usize, StoreError>;

    // --- scope ---
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;

    fn rollback(self)
    where
        Self: Sized;
}
