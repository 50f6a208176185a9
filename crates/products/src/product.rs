use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockkeep_core::validate::{non_negative, optional_text, required_text};
use stockkeep_core::{
    CategoryId, DomainError, DomainResult, Entity, ProductId, SupplierId, Versioned,
};

/// Editable catalog attributes of a product.
///
/// Stock is deliberately absent: it only moves through the stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    pub unit_price: Decimal,
    pub minimum_stock_level: i64,
    pub category_id: CategoryId,
    pub supplier_id: SupplierId,
}

impl ProductDetails {
    fn validate(&self) -> DomainResult<()> {
        required_text("product name", &self.name, Product::NAME_MAX)?;
        optional_text("product description", &self.description, Product::DESCRIPTION_MAX)?;
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        non_negative("minimum stock level", self.minimum_stock_level)
    }
}

/// Input for registering a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub product_id: ProductId,
    pub details: ProductDetails,
    pub initial_stock: i64,
}

/// A stocked product.
///
/// Products do not own their inventory transactions or order lines; those records
/// reference the product by id and are looked up through the store. Deserializing
/// runs the same validation as [`Product::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    unit_price: Decimal,
    current_stock: i64,
    minimum_stock_level: i64,
    category_id: CategoryId,
    supplier_id: SupplierId,
    version: u64,
}

impl Product {
    pub const NAME_MAX: usize = 100;
    pub const DESCRIPTION_MAX: usize = 500;

    pub fn new(input: NewProduct) -> DomainResult<Self> {
        input.details.validate()?;
        non_negative("initial stock", input.initial_stock)?;

        let d = input.details;
        Ok(Self {
            id: input.product_id,
            name: d.name,
            description: d.description,
            unit_price: d.unit_price,
            current_stock: input.initial_stock,
            minimum_stock_level: d.minimum_stock_level,
            category_id: d.category_id,
            supplier_id: d.supplier_id,
            version: 0,
        })
    }

    /// Replace the catalog attributes. Stock is left untouched.
    pub fn update_details(&mut self, details: ProductDetails) -> DomainResult<()> {
        details.validate()?;
        self.name = details.name;
        self.description = details.description;
        self.unit_price = details.unit_price;
        self.minimum_stock_level = details.minimum_stock_level;
        self.category_id = details.category_id;
        self.supplier_id = details.supplier_id;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn current_stock(&self) -> i64 {
        self.current_stock
    }

    pub fn minimum_stock_level(&self) -> i64 {
        self.minimum_stock_level
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    /// Low-stock flag: at or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock_level
    }

    /// Snapshot of this product carrying a new stock level.
    ///
    /// Stores call this while persisting a ledger write; nothing else should.
    pub fn with_stock(&self, stock: i64) -> DomainResult<Self> {
        non_negative("current stock", stock)?;
        Ok(Self {
            current_stock: stock,
            ..self.clone()
        })
    }

    /// Snapshot of this product stamped with a store-assigned version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

/// Wire shape of [`Product`], checked before it becomes one.
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    description: String,
    unit_price: Decimal,
    current_stock: i64,
    minimum_stock_level: i64,
    category_id: CategoryId,
    supplier_id: SupplierId,
    version: u64,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(r: ProductRecord) -> DomainResult<Self> {
        let product = Product::new(NewProduct {
            product_id: r.id,
            details: ProductDetails {
                name: r.name,
                description: r.description,
                unit_price: r.unit_price,
                minimum_stock_level: r.minimum_stock_level,
                category_id: r.category_id,
                supplier_id: r.supplier_id,
            },
            initial_stock: r.current_stock,
        })?;
        Ok(product.with_version(r.version))
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Versioned for Product {
    fn version(&self) -> u64 {
        self.version
    }
}
