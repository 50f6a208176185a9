use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use stockkeep_core::{
    CategoryId, Entity, ExpectedVersion, OrderDetailId, ProductId, PurchaseOrderId, SupplierId,
    TransactionId, Versioned,
};
use stockkeep_inventory::InventoryTransaction;
use stockkeep_parties::Supplier;
use stockkeep_products::{Category, Product};
use stockkeep_purchasing::{OrderDetail, PurchaseOrder};

use super::r#trait::{Store, StoreError, UnitOfWork};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum RowKey {
    Product(ProductId),
    Category(CategoryId),
    Supplier(SupplierId),
    Transaction(TransactionId),
    Order(PurchaseOrderId),
    Detail(OrderDetailId),
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    suppliers: HashMap<SupplierId, Supplier>,
    transactions: HashMap<TransactionId, InventoryTransaction>,
    orders: HashMap<PurchaseOrderId, PurchaseOrder>,
    /// Detail rows keyed by id, with their insertion sequence.
    details: HashMap<OrderDetailId, (u64, OrderDetail)>,
}

impl Tables {
    fn version_of(&self, key: RowKey) -> Option<u64> {
        match key {
            RowKey::Product(id) => self.products.get(&id).map(Versioned::version),
            RowKey::Order(id) => self.orders.get(&id).map(Versioned::version),
            _ => None,
        }
    }

    fn contains(&self, key: RowKey) -> bool {
        match key {
            RowKey::Product(id) => self.products.contains_key(&id),
            RowKey::Category(id) => self.categories.contains_key(&id),
            RowKey::Supplier(id) => self.suppliers.contains_key(&id),
            RowKey::Transaction(id) => self.transactions.contains_key(&id),
            RowKey::Order(id) => self.orders.contains_key(&id),
            RowKey::Detail(id) => self.details.contains_key(&id),
        }
    }

    /// Make `self`'s row for `key` match `source`'s (copy, or remove if absent).
    fn copy_row(&mut self, source: &Tables, key: RowKey) {
        fn sync<K, V>(dst: &mut HashMap<K, V>, src: &HashMap<K, V>, k: K)
        where
            K: Eq + core::hash::Hash + Copy,
            V: Clone,
        {
            match src.get(&k) {
                Some(v) => {
                    dst.insert(k, v.clone());
                }
                None => {
                    dst.remove(&k);
                }
            }
        }

        match key {
            RowKey::Product(id) => sync(&mut self.products, &source.products, id),
            RowKey::Category(id) => sync(&mut self.categories, &source.categories, id),
            RowKey::Supplier(id) => sync(&mut self.suppliers, &source.suppliers, id),
            RowKey::Transaction(id) => sync(&mut self.transactions, &source.transactions, id),
            RowKey::Order(id) => sync(&mut self.orders, &source.orders, id),
            RowKey::Detail(id) => sync(&mut self.details, &source.details, id),
        }
    }

    /// Describe the first foreign-key rule `key`'s row (or its absence) breaks.
    ///
    /// A present row must point at present parents; a removed row must have
    /// no children left.
    fn integrity_violation(&self, key: RowKey) -> Option<String> {
        match key {
            RowKey::Product(id) => match self.products.get(&id) {
                Some(p) if !self.categories.contains_key(&p.category_id()) => {
                    Some(format!("product {id} refers to missing category {}", p.category_id()))
                }
                Some(p) if !self.suppliers.contains_key(&p.supplier_id()) => {
                    Some(format!("product {id} refers to missing supplier {}", p.supplier_id()))
                }
                Some(_) => None,
                None if self.transactions.values().any(|t| t.product_id() == id)
                    || self.details.values().any(|(_, d)| d.product_id() == id) =>
                {
                    Some(format!("removed product {id} is still referenced"))
                }
                None => None,
            },
            RowKey::Category(id) => (!self.categories.contains_key(&id)
                && self.products.values().any(|p| p.category_id() == id))
            .then(|| format!("removed category {id} is still referenced")),
            RowKey::Supplier(id) => (!self.suppliers.contains_key(&id)
                && (self.products.values().any(|p| p.supplier_id() == id)
                    || self.orders.values().any(|o| o.supplier_id() == id)))
            .then(|| format!("removed supplier {id} is still referenced")),
            RowKey::Transaction(id) => self
                .transactions
                .get(&id)
                .filter(|t| !self.products.contains_key(&t.product_id()))
                .map(|t| format!("transaction {id} refers to missing product {}", t.product_id())),
            RowKey::Order(id) => match self.orders.get(&id) {
                Some(o) if !self.suppliers.contains_key(&o.supplier_id()) => {
                    Some(format!("order {id} refers to missing supplier {}", o.supplier_id()))
                }
                Some(_) => None,
                None if self.details.values().any(|(_, d)| d.order_id() == id) => {
                    Some(format!("removed order {id} still has details"))
                }
                None => None,
            },
            RowKey::Detail(id) => self.details.get(&id).and_then(|(_, d)| {
                if !self.orders.contains_key(&d.order_id()) {
                    Some(format!("detail {id} refers to missing order {}", d.order_id()))
                } else if !self.products.contains_key(&d.product_id()) {
                    Some(format!("detail {id} refers to missing product {}", d.product_id()))
                } else {
                    None
                }
            }),
        }
    }
}

/// A one-shot failure the in-memory store can be told to produce.
///
/// Used to verify that services roll back cleanly when the store fails halfway
/// through a unit of work.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaultPoint {
    /// Fail the n-th (1-based) stock write made inside a single scope.
    StockWrite { nth: usize },
    /// Fail the next commit after it has passed validation.
    Commit,
}

#[derive(Debug, Default)]
struct Shared {
    tables: RwLock<Tables>,
    fault: Mutex<Option<FaultPoint>>,
    /// Insertion sequence for transactions and detail rows. Allocated at insert time,
    /// so rolled-back scopes leave gaps.
    sequence: AtomicU64,
}

/// In-memory transactional store.
///
/// Intended for tests/dev and for embedding. Not optimized for performance: each
/// scope works on a private copy of the tables and merges its touched rows back on
/// commit under the write lock, after re-validating every version it based a write
/// on. Foreign keys touched by the scope are checked again against the merged
/// tables, so a concurrent delete and insert cannot leave an orphan behind.
/// Cloning the store shares the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot fault. Replaces any fault armed earlier.
    pub fn inject_fault(&self, point: FaultPoint) {
        if let Ok(mut fault) = self.shared.fault.lock() {
            *fault = Some(point);
        }
    }

    /// Consume the armed fault if it equals `point`.
    fn trip(&self, point: FaultPoint) -> bool {
        match self.shared.fault.lock() {
            Ok(mut fault) if *fault == Some(point) => {
                *fault = None;
                true
            }
            _ => false,
        }
    }

    fn next_sequence(&self) -> u64 {
        self.shared.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn committed_version(&self, key: RowKey) -> Result<Option<u64>, StoreError> {
        let tables = self.shared.tables.read().map_err(|_| poisoned())?;
        Ok(tables.version_of(key))
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl Store for InMemoryStore {
    type Scope<'a> = InMemoryScope<'a>;

    fn begin(&self) -> Result<InMemoryScope<'_>, StoreError> {
        let tables = self.shared.tables.read().map_err(|_| poisoned())?;
        Ok(InMemoryScope {
            store: self,
            working: tables.clone(),
            base_versions: HashMap::new(),
            inserted: HashSet::new(),
            dirty: Vec::new(),
            stock_writes: 0,
        })
    }
}

/// Unit of work over an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryScope<'a> {
    store: &'a InMemoryStore,
    working: Tables,
    /// Version each pre-existing versioned row had when this scope first wrote it.
    base_versions: HashMap<RowKey, u64>,
    /// Rows created by this scope.
    inserted: HashSet<RowKey>,
    /// Rows touched by this scope, in first-touch order.
    dirty: Vec<RowKey>,
    stock_writes: usize,
}

impl InMemoryScope<'_> {
    fn touch(&mut self, key: RowKey) {
        if !self.dirty.contains(&key) {
            self.dirty.push(key);
        }
    }

    fn insert_key(&mut self, key: RowKey) -> Result<(), StoreError> {
        if self.working.contains(key) {
            return Err(StoreError::Constraint(format!("duplicate key {key:?}")));
        }
        self.inserted.insert(key);
        self.touch(key);
        Ok(())
    }

    /// Check `expected` against the row's current version and, on the first write
    /// to a pre-existing row, against the committed version as well.
    fn guard_version(
        &mut self,
        key: RowKey,
        current: u64,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        if !expected.matches(current) {
            return Err(StoreError::Conflict(format!(
                "{key:?}: expected {expected:?}, found {current}"
            )));
        }

        if self.inserted.contains(&key) || self.base_versions.contains_key(&key) {
            return Ok(());
        }

        match self.store.committed_version(key)? {
            Some(committed) if committed == current => {
                self.base_versions.insert(key, current);
                Ok(())
            }
            found => Err(StoreError::Conflict(format!(
                "{key:?} modified concurrently (read version {current}, committed {found:?})"
            ))),
        }
    }

    fn require_product(&self, id: ProductId) -> Result<&Product, StoreError> {
        self.working
            .products
            .get(&id)
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    fn require_order(&self, id: PurchaseOrderId) -> Result<&PurchaseOrder, StoreError> {
        self.working
            .orders
            .get(&id)
            .ok_or_else(|| StoreError::not_found("purchase order", id))
    }

    fn dangling(what: &str, id: impl core::fmt::Display) -> StoreError {
        StoreError::Constraint(format!("dangling reference to {what} {id}"))
    }
}

fn sorted_by_id<T, I>(rows: impl Iterator<Item = T>, id: impl Fn(&T) -> I) -> Vec<T>
where
    I: Ord,
{
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|r| id(r));
    rows
}

impl UnitOfWork for InMemoryScope<'_> {
    fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.require_product(id).cloned()
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(sorted_by_id(self.working.products.values().cloned(), Product::id))
    }

    fn insert_product(&mut self, product: Product) -> Result<(), StoreError> {
        if !self.working.categories.contains_key(&product.category_id()) {
            return Err(Self::dangling("category", product.category_id()));
        }
        if !self.working.suppliers.contains_key(&product.supplier_id()) {
            return Err(Self::dangling("supplier", product.supplier_id()));
        }
        let id = product.id();
        self.insert_key(RowKey::Product(id))?;
        self.working.products.insert(id, product.with_version(0));
        Ok(())
    }

    fn update_product(
        &mut self,
        product: Product,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        let id = product.id();
        let existing = self.require_product(id)?;
        let (current, stock) = (existing.version(), existing.current_stock());
        if product.current_stock() != stock {
            return Err(StoreError::Constraint(format!(
                "stock of product {id} can only change through a stock write"
            )));
        }
        if !self.working.categories.contains_key(&product.category_id()) {
            return Err(Self::dangling("category", product.category_id()));
        }
        if !self.working.suppliers.contains_key(&product.supplier_id()) {
            return Err(Self::dangling("supplier", product.supplier_id()));
        }

        self.guard_version(RowKey::Product(id), current, expected)?;
        let version = current + 1;
        self.working.products.insert(id, product.with_version(version));
        self.touch(RowKey::Product(id));
        Ok(version)
    }

    fn update_product_stock(
        &mut self,
        id: ProductId,
        new_stock: i64,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        let current = self.require_product(id)?.version();
        self.guard_version(RowKey::Product(id), current, expected)?;

        self.stock_writes += 1;
        if self.store.trip(FaultPoint::StockWrite {
            nth: self.stock_writes,
        }) {
            return Err(StoreError::Backend(format!(
                "injected failure on stock write #{}",
                self.stock_writes
            )));
        }

        let version = current + 1;
        let updated = self
            .require_product(id)?
            .with_stock(new_stock)
            .map_err(|e| StoreError::Constraint(e.to_string()))?
            .with_version(version);
        self.working.products.insert(id, updated);
        self.touch(RowKey::Product(id));
        Ok(version)
    }

    fn delete_product(&mut self, id: ProductId) -> Result<(), StoreError> {
        let current = self.require_product(id)?.version();
        if self.working.transactions.values().any(|t| t.product_id() == id)
            || self.working.details.values().any(|(_, d)| d.product_id() == id)
        {
            return Err(StoreError::Referenced(format!("product {id}")));
        }
        self.guard_version(RowKey::Product(id), current, ExpectedVersion::Any)?;
        self.working.products.remove(&id);
        self.touch(RowKey::Product(id));
        Ok(())
    }

    fn get_category(&self, id: CategoryId) -> Result<Category, StoreError> {
        self.working
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("category", id))
    }

    fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(sorted_by_id(self.working.categories.values().cloned(), Category::id))
    }

    fn upsert_category(&mut self, category: Category) -> Result<(), StoreError> {
        let key = RowKey::Category(category.id());
        self.working.categories.insert(category.id(), category);
        self.touch(key);
        Ok(())
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<(), StoreError> {
        if !self.working.categories.contains_key(&id) {
            return Err(StoreError::not_found("category", id));
        }
        if self.working.products.values().any(|p| p.category_id() == id) {
            return Err(StoreError::Referenced(format!("category {id}")));
        }
        self.working.categories.remove(&id);
        self.touch(RowKey::Category(id));
        Ok(())
    }

    fn get_supplier(&self, id: SupplierId) -> Result<Supplier, StoreError> {
        self.working
            .suppliers
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("supplier", id))
    }

    fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        Ok(sorted_by_id(self.working.suppliers.values().cloned(), Supplier::id))
    }

    fn upsert_supplier(&mut self, supplier: Supplier) -> Result<(), StoreError> {
        let key = RowKey::Supplier(supplier.id());
        self.working.suppliers.insert(supplier.id(), supplier);
        self.touch(key);
        Ok(())
    }

    fn delete_supplier(&mut self, id: SupplierId) -> Result<(), StoreError> {
        if !self.working.suppliers.contains_key(&id) {
            return Err(StoreError::not_found("supplier", id));
        }
        if self.working.products.values().any(|p| p.supplier_id() == id)
            || self.working.orders.values().any(|o| o.supplier_id() == id)
        {
            return Err(StoreError::Referenced(format!("supplier {id}")));
        }
        self.working.suppliers.remove(&id);
        self.touch(RowKey::Supplier(id));
        Ok(())
    }

    fn products_in_category(&self, id: CategoryId) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .working
            .products
            .values()
            .filter(|p| p.category_id() == id)
            .cloned();
        Ok(sorted_by_id(rows, Product::id))
    }

    fn products_of_supplier(&self, id: SupplierId) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .working
            .products
            .values()
            .filter(|p| p.supplier_id() == id)
            .cloned();
        Ok(sorted_by_id(rows, Product::id))
    }

    fn orders_of_supplier(&self, id: SupplierId) -> Result<Vec<PurchaseOrder>, StoreError> {
        let rows = self
            .working
            .orders
            .values()
            .filter(|o| o.supplier_id() == id)
            .cloned();
        Ok(sorted_by_id(rows, PurchaseOrder::id))
    }

    fn transactions_for_product(
        &self,
        id: ProductId,
    ) -> Result<Vec<InventoryTransaction>, StoreError> {
        let rows = self
            .working
            .transactions
            .values()
            .filter(|t| t.product_id() == id)
            .cloned();
        Ok(sorted_by_id(rows, InventoryTransaction::sequence))
    }

    fn details_for_product(&self, id: ProductId) -> Result<Vec<OrderDetail>, StoreError> {
        let rows = self
            .working
            .details
            .values()
            .filter(|(_, d)| d.product_id() == id)
            .cloned();
        Ok(sorted_by_id(rows, |(seq, _)| *seq)
            .into_iter()
            .map(|(_, d)| d)
            .collect())
    }

    fn get_transaction(&self, id: TransactionId) -> Result<InventoryTransaction, StoreError> {
        self.working
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("inventory transaction", id))
    }

    fn insert_inventory_transaction(
        &mut self,
        transaction: InventoryTransaction,
    ) -> Result<InventoryTransaction, StoreError> {
        if !self.working.products.contains_key(&transaction.product_id()) {
            return Err(Self::dangling("product", transaction.product_id()));
        }
        let key = RowKey::Transaction(transaction.id());
        self.insert_key(key)?;
        let stored = transaction.with_sequence(self.store.next_sequence());
        self.working.transactions.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    fn update_inventory_transaction(
        &mut self,
        transaction: InventoryTransaction,
    ) -> Result<(), StoreError> {
        let id = transaction.id();
        let sequence = self.get_transaction(id)?.sequence();
        if !self.working.products.contains_key(&transaction.product_id()) {
            return Err(Self::dangling("product", transaction.product_id()));
        }
        self.working
            .transactions
            .insert(id, transaction.with_sequence(sequence));
        self.touch(RowKey::Transaction(id));
        Ok(())
    }

    fn get_order(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, StoreError> {
        self.require_order(id).cloned()
    }

    fn list_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        Ok(sorted_by_id(self.working.orders.values().cloned(), PurchaseOrder::id))
    }

    fn insert_order(&mut self, order: PurchaseOrder) -> Result<(), StoreError> {
        if !self.working.suppliers.contains_key(&order.supplier_id()) {
            return Err(Self::dangling("supplier", order.supplier_id()));
        }
        let id = order.id();
        self.insert_key(RowKey::Order(id))?;
        self.working.orders.insert(id, order.with_version(0));
        Ok(())
    }

    fn update_order(
        &mut self,
        order: PurchaseOrder,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        let id = order.id();
        let current = self.require_order(id)?.version();
        if !self.working.suppliers.contains_key(&order.supplier_id()) {
            return Err(Self::dangling("supplier", order.supplier_id()));
        }
        self.guard_version(RowKey::Order(id), current, expected)?;
        let version = current + 1;
        self.working.orders.insert(id, order.with_version(version));
        self.touch(RowKey::Order(id));
        Ok(version)
    }

    fn delete_order(
        &mut self,
        id: PurchaseOrderId,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let current = self.require_order(id)?.version();
        self.guard_version(RowKey::Order(id), current, expected)?;
        // Details are owned by the order and go with it.
        self.delete_order_details(id)?;
        self.working.orders.remove(&id);
        self.touch(RowKey::Order(id));
        Ok(())
    }

    fn order_details(&self, id: PurchaseOrderId) -> Result<Vec<OrderDetail>, StoreError> {
        self.require_order(id)?;
        let rows = self
            .working
            .details
            .values()
            .filter(|(_, d)| d.order_id() == id)
            .cloned();
        Ok(sorted_by_id(rows, |(seq, _)| *seq)
            .into_iter()
            .map(|(_, d)| d)
            .collect())
    }

    fn insert_order_detail(&mut self, detail: OrderDetail) -> Result<(), StoreError> {
        if !self.working.orders.contains_key(&detail.order_id()) {
            return Err(Self::dangling("purchase order", detail.order_id()));
        }
        if !self.working.products.contains_key(&detail.product_id()) {
            return Err(Self::dangling("product", detail.product_id()));
        }
        let key = RowKey::Detail(detail.id());
        self.insert_key(key)?;
        let seq = self.store.next_sequence();
        self.working.details.insert(detail.id(), (seq, detail));
        Ok(())
    }

    fn delete_order_details(&mut self, id: PurchaseOrderId) -> Result<usize, StoreError> {
        let ids: Vec<OrderDetailId> = self
            .working
            .details
            .iter()
            .filter(|(_, (_, d))| d.order_id() == id)
            .map(|(detail_id, _)| *detail_id)
            .collect();
        for detail_id in &ids {
            self.working.details.remove(detail_id);
            self.touch(RowKey::Detail(*detail_id));
        }
        Ok(ids.len())
    }

    fn commit(self) -> Result<(), StoreError> {
        let Self {
            store,
            working,
            base_versions,
            inserted,
            dirty,
            ..
        } = self;

        let mut committed = store.shared.tables.write().map_err(|_| poisoned())?;

        for (key, base) in &base_versions {
            match committed.version_of(*key) {
                Some(v) if v == *base => {}
                found => {
                    return Err(StoreError::Conflict(format!(
                        "{key:?} modified concurrently (based on version {base}, committed {found:?})"
                    )));
                }
            }
        }
        for key in &inserted {
            if committed.contains(*key) {
                return Err(StoreError::Conflict(format!(
                    "{key:?} inserted concurrently"
                )));
            }
        }

        if store.trip(FaultPoint::Commit) {
            return Err(StoreError::Backend("injected commit failure".to_string()));
        }

        // Scopes only see their own snapshot, so references are checked again
        // against the merged result; a violation undoes the merge.
        let mut undo = Tables::default();
        for key in &dirty {
            undo.copy_row(&committed, *key);
            committed.copy_row(&working, *key);
        }
        let violation = dirty
            .iter()
            .find_map(|key| committed.integrity_violation(*key));
        if let Some(violation) = violation {
            for key in &dirty {
                committed.copy_row(&undo, *key);
            }
            return Err(StoreError::Conflict(format!(
                "{violation} after a concurrent commit"
            )));
        }

        tracing::debug!(rows = dirty.len(), "committed in-memory scope");
        Ok(())
    }

    fn rollback(self) {
        tracing::debug!(rows = self.dirty.len(), "rolled back in-memory scope");
    }
}
