//! Infrastructure layer: transactional store, stock ledger, application services.
//!
//! ## Layout
//!
//! - [`store`]: the `Store` / `UnitOfWork` boundary and the in-memory implementation.
//! - [`unit_of_work`]: atomic execution with conflict retry.
//! - [`ledger`]: the only code path that changes a product's stock.
//! - [`services`]: inventory transactions, purchase orders, catalog, suppliers.
//! - [`config`]: runtime configuration.

pub mod config;
pub mod ledger;
pub mod services;
pub mod store;
pub mod unit_of_work;

use crate::config::{ConfigError, StockKeepConfig};
use crate::services::{
    CatalogService, InventoryTransactionService, PurchaseOrderService, SupplierService,
};
use crate::store::Store;

/// Every service wired to one shared store.
#[derive(Debug, Clone)]
pub struct Services<S> {
    pub catalog: CatalogService<S>,
    pub suppliers: SupplierService<S>,
    pub transactions: InventoryTransactionService<S>,
    pub purchase_orders: PurchaseOrderService<S>,
    /// Configuration the services were built with.
    pub config: StockKeepConfig,
}

impl<S: Store + Clone> Services<S> {
    /// Wire the services without touching global tracing state.
    pub fn new(store: S, config: &StockKeepConfig) -> Self {
        let policy = config.retry_policy();
        Self {
            catalog: CatalogService::new(store.clone(), policy),
            suppliers: SupplierService::new(store.clone(), policy),
            transactions: InventoryTransactionService::new(store.clone(), policy),
            purchase_orders: PurchaseOrderService::new(store, policy),
            config: config.clone(),
        }
    }

    /// Install process-wide tracing filtered by `config.log_filter`, then wire the
    /// services. Later calls leave the first subscriber in place.
    pub fn bootstrap(store: S, config: &StockKeepConfig) -> Self {
        stockkeep_observability::init_with_filter(&config.log_filter);
        tracing::info!(
            conflict_retries = config.conflict_retries,
            log_filter = %config.log_filter,
            "stockkeep services ready"
        );
        Self::new(store, config)
    }

    /// [`Services::bootstrap`] with configuration read from `STOCKKEEP_*` variables.
    pub fn from_env(store: S) -> Result<Self, ConfigError> {
        let config = StockKeepConfig::from_env()?;
        Ok(Self::bootstrap(store, &config))
    }
}
