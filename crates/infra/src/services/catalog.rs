//! Product and category maintenance, plus the stock reports built on them.
//!
//! Product updates never touch stock; a new product may start with an initial stock
//! level, after which only the ledger moves it.

use serde::Serialize;
use tracing::{info, instrument};

use stockkeep_core::{
    CategoryId, DomainError, DomainResult, Entity, ExpectedVersion, ProductId, SupplierId,
    Versioned,
};
use stockkeep_products::{Category, NewProduct, Product, ProductDetails};

use crate::store::{Store, UnitOfWork};
use crate::unit_of_work::{self, RetryPolicy};

/// Headline numbers for the inventory dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_suppliers: usize,
    pub low_stock_products: Vec<Product>,
}

#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
    policy: RetryPolicy,
}

/// Fail unless the category and supplier a product points at both exist.
fn check_references<U>(scope: &U, category_id: CategoryId, supplier_id: SupplierId) -> DomainResult<()>
where
    U: UnitOfWork + ?Sized,
{
    scope.get_category(category_id)?;
    scope.get_supplier(supplier_id)?;
    Ok(())
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    // --- categories ---

    #[instrument(skip(self, description), err)]
    pub fn create_category(&self, name: &str, description: &str) -> DomainResult<Category> {
        let category = Category::new(CategoryId::new(), name, description)?;
        unit_of_work::execute(&self.store, self.policy, |scope| {
            scope.upsert_category(category.clone())?;
            Ok(())
        })?;
        info!(category_id = %category.id(), "category created");
        Ok(category)
    }

    #[instrument(skip(self, description), err)]
    pub fn update_category(
        &self,
        category_id: CategoryId,
        name: &str,
        description: &str,
    ) -> DomainResult<Category> {
        unit_of_work::execute(&self.store, self.policy, |scope| {
            let mut category = scope.get_category(category_id)?;
            category.rename(name, description)?;
            scope.upsert_category(category.clone())?;
            Ok(category)
        })
    }

    /// Delete a category that no product belongs to.
    #[instrument(skip(self), err)]
    pub fn delete_category(&self, category_id: CategoryId) -> DomainResult<()> {
        unit_of_work::execute(&self.store, self.policy, |scope| {
            let products = scope.products_in_category(category_id)?;
            if !products.is_empty() {
                return Err(DomainError::still_referenced(format!(
                    "category {category_id} still has {} product(s)",
                    products.len()
                )));
            }
            scope.delete_category(category_id)?;
            Ok(())
        })
    }

    pub fn list_categories(&self) -> DomainResult<Vec<Category>> {
        unit_of_work::read(&self.store, |scope| Ok(scope.list_categories()?))
    }

    // --- products ---

    #[instrument(
        skip(self, details),
        fields(name = %details.name, category_id = %details.category_id, supplier_id = %details.supplier_id),
        err
    )]
    pub fn create_product(&self, details: ProductDetails, initial_stock: i64) -> DomainResult<Product> {
        let product = Product::new(NewProduct {
            product_id: ProductId::new(),
            details,
            initial_stock,
        })?;

        unit_of_work::execute(&self.store, self.policy, |scope| {
            check_references(scope, product.category_id(), product.supplier_id())?;
            scope.insert_product(product.clone())?;
            Ok(())
        })?;

        info!(product_id = %product.id(), initial_stock, "product created");
        Ok(product)
    }

    /// Replace a product's catalog attributes. Stock is left as it is.
    #[instrument(skip(self, details), err)]
    pub fn update_product(&self, product_id: ProductId, details: ProductDetails) -> DomainResult<Product> {
        unit_of_work::execute(&self.store, self.policy, |scope| {
            let mut product = scope.get_product(product_id)?;
            let expected = ExpectedVersion::Exact(product.version());
            check_references(scope, details.category_id, details.supplier_id)?;
            product.update_details(details.clone())?;
            let version = scope.update_product(product.clone(), expected)?;
            Ok(product.with_version(version))
        })
    }

    /// Delete a product that no transaction or order line refers to.
    #[instrument(skip(self), err)]
    pub fn delete_product(&self, product_id: ProductId) -> DomainResult<()> {
        unit_of_work::execute(&self.store, self.policy, |scope| {
            scope.get_product(product_id)?;
            let transactions = scope.transactions_for_product(product_id)?.len();
            let lines = scope.details_for_product(product_id)?.len();
            if transactions > 0 || lines > 0 {
                return Err(DomainError::still_referenced(format!(
                    "product {product_id} has {transactions} transaction(s) and {lines} order line(s)"
                )));
            }
            scope.delete_product(product_id)?;
            Ok(())
        })?;
        info!("product deleted");
        Ok(())
    }

    pub fn get_product(&self, product_id: ProductId) -> DomainResult<Product> {
        unit_of_work::read(&self.store, |scope| Ok(scope.get_product(product_id)?))
    }

    pub fn list_products(&self) -> DomainResult<Vec<Product>> {
        unit_of_work::read(&self.store, |scope| Ok(scope.list_products()?))
    }

    pub fn products_by_supplier(&self, supplier_id: SupplierId) -> DomainResult<Vec<Product>> {
        unit_of_work::read(&self.store, |scope| {
            scope.get_supplier(supplier_id)?;
            Ok(scope.products_of_supplier(supplier_id)?)
        })
    }

    /// Products at or below their minimum stock level.
    pub fn low_stock_report(&self) -> DomainResult<Vec<Product>> {
        unit_of_work::read(&self.store, |scope| {
            Ok(scope
                .list_products()?
                .into_iter()
                .filter(Product::is_low_stock)
                .collect())
        })
    }

    #[instrument(skip(self), err)]
    pub fn summary(&self) -> DomainResult<DashboardSummary> {
        unit_of_work::read(&self.store, |scope| {
            let products = scope.list_products()?;
            let total_products = products.len();
            Ok(DashboardSummary {
                total_products,
                total_suppliers: scope.list_suppliers()?.len(),
                low_stock_products: products.into_iter().filter(Product::is_low_stock).collect(),
            })
        })
    }
}
