//! Supplier registry.

use tracing::{info, instrument};

use stockkeep_core::{DomainError, DomainResult, Entity, SupplierId};
use stockkeep_parties::{ContactInfo, Supplier};

use crate::store::{Store, UnitOfWork};
use crate::unit_of_work::{self, RetryPolicy};

#[derive(Debug, Clone)]
pub struct SupplierService<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: Store> SupplierService<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Register a new, active supplier.
    #[instrument(skip(self, contact), err)]
    pub fn register(&self, name: &str, contact: ContactInfo) -> DomainResult<Supplier> {
        let supplier = Supplier::new(SupplierId::new(), name, contact)?;
        unit_of_work::execute(&self.store, self.policy, |scope| {
            scope.upsert_supplier(supplier.clone())?;
            Ok(())
        })?;
        info!(supplier_id = %supplier.id(), "supplier registered");
        Ok(supplier)
    }

    #[instrument(skip(self, contact), err)]
    pub fn update(&self, supplier_id: SupplierId, name: &str, contact: ContactInfo) -> DomainResult<Supplier> {
        self.modify(supplier_id, |supplier| supplier.update_details(name, contact.clone()))
    }

    /// Activate or deactivate. Inactive suppliers keep their products and orders but
    /// cannot receive new purchase orders.
    #[instrument(skip(self), err)]
    pub fn set_active(&self, supplier_id: SupplierId, active: bool) -> DomainResult<Supplier> {
        self.modify(supplier_id, |supplier| {
            if active {
                supplier.activate();
            } else {
                supplier.deactivate();
            }
            Ok(())
        })
    }

    /// Delete a supplier no product or purchase order refers to.
    #[instrument(skip(self), err)]
    pub fn delete(&self, supplier_id: SupplierId) -> DomainResult<()> {
        unit_of_work::execute(&self.store, self.policy, |scope| {
            scope.get_supplier(supplier_id)?;
            let products = scope.products_of_supplier(supplier_id)?.len();
            let orders = scope.orders_of_supplier(supplier_id)?.len();
            if products > 0 || orders > 0 {
                return Err(DomainError::still_referenced(format!(
                    "supplier {supplier_id} has {products} product(s) and {orders} purchase order(s)"
                )));
            }
            scope.delete_supplier(supplier_id)?;
            Ok(())
        })?;
        info!("supplier deleted");
        Ok(())
    }

    pub fn get(&self, supplier_id: SupplierId) -> DomainResult<Supplier> {
        unit_of_work::read(&self.store, |scope| Ok(scope.get_supplier(supplier_id)?))
    }

    pub fn list(&self) -> DomainResult<Vec<Supplier>> {
        unit_of_work::read(&self.store, |scope| Ok(scope.list_suppliers()?))
    }

    fn modify(
        &self,
        supplier_id: SupplierId,
        mut change: impl FnMut(&mut Supplier) -> DomainResult<()>,
    ) -> DomainResult<Supplier> {
        unit_of_work::execute(&self.store, self.policy, |scope| {
            let mut supplier = scope.get_supplier(supplier_id)?;
            change(&mut supplier)?;
            scope.upsert_supplier(supplier.clone())?;
            Ok(supplier)
        })
    }
}
