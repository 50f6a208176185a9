#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use stockkeep_core::{CategoryId, DomainResult, Entity, ProductId, PurchaseOrderId, SupplierId, UserId};
use stockkeep_infra::config::StockKeepConfig;
use stockkeep_infra::services::{
    CreatePurchaseOrder, OrderUpdate, PurchaseOrderView, TransactionReceipt, UpdateOrderStatus,
};
use stockkeep_infra::store::InMemoryStore;
use stockkeep_infra::Services;
use stockkeep_inventory::{RecordTransaction, TransactionType};
use stockkeep_parties::ContactInfo;
use stockkeep_products::ProductDetails;
use stockkeep_purchasing::{OrderHeader, OrderLine, PurchaseOrderStatus};

/// Fixed base time so ordering in tests is deterministic.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn contact(name: &str) -> ContactInfo {
    ContactInfo {
        contact_person: name.to_string(),
        email: format!("{}@supplier.example", name.to_lowercase()),
        phone: "+1 555-0100".to_string(),
        address: "1 Warehouse Way".to_string(),
    }
}

pub struct Fixture {
    pub store: InMemoryStore,
    pub services: Services<InMemoryStore>,
    pub actor: UserId,
    pub category_id: CategoryId,
    pub supplier_id: SupplierId,
}

impl Fixture {
    pub fn new() -> Self {
        let config = StockKeepConfig {
            log_filter: "warn".to_string(),
            ..StockKeepConfig::default()
        };
        let store = InMemoryStore::new();
        let services = Services::bootstrap(store.clone(), &config);
        let category = services.catalog.create_category("General", "").unwrap();
        let supplier = services.suppliers.register("Acme", contact("Dana")).unwrap();

        Self {
            store,
            services,
            actor: UserId::new(),
            category_id: category.id(),
            supplier_id: supplier.id(),
        }
    }

    pub fn details(&self, name: &str, minimum_stock_level: i64) -> ProductDetails {
        ProductDetails {
            name: name.to_string(),
            description: String::new(),
            unit_price: Decimal::ONE,
            minimum_stock_level,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
        }
    }

    pub fn product(&self, initial_stock: i64, minimum_stock_level: i64) -> ProductId {
        self.services
            .catalog
            .create_product(self.details("Widget", minimum_stock_level), initial_stock)
            .unwrap()
            .id()
    }

    pub fn movement(
        &self,
        product_id: ProductId,
        kind: TransactionType,
        quantity: i64,
        minutes: i64,
    ) -> RecordTransaction {
        RecordTransaction {
            product_id,
            kind,
            quantity,
            reason: "test".to_string(),
            reference_number: format!("REF-{minutes}"),
            occurred_at: at(minutes),
            actor: self.actor,
        }
    }

    pub fn record(
        &self,
        product_id: ProductId,
        kind: TransactionType,
        quantity: i64,
        minutes: i64,
    ) -> DomainResult<TransactionReceipt> {
        self.services
            .transactions
            .create(self.movement(product_id, kind, quantity, minutes))
    }

    pub fn header(&self) -> OrderHeader {
        OrderHeader {
            supplier_id: self.supplier_id,
            order_date: at(0),
            expected_delivery_date: Some(at(60 * 24)),
            notes: String::new(),
        }
    }

    pub fn lines(lines: &[(ProductId, i64, Decimal)]) -> Vec<OrderLine> {
        lines
            .iter()
            .map(|(product_id, quantity, unit_price)| OrderLine {
                product_id: *product_id,
                quantity: *quantity,
                unit_price: *unit_price,
            })
            .collect()
    }

    pub fn order(&self, lines: &[(ProductId, i64, Decimal)]) -> DomainResult<PurchaseOrderView> {
        self.services.purchase_orders.create(CreatePurchaseOrder {
            header: self.header(),
            lines: Self::lines(lines),
            actor: self.actor,
        })
    }

    pub fn set_status(
        &self,
        order_id: PurchaseOrderId,
        status: PurchaseOrderStatus,
    ) -> DomainResult<OrderUpdate> {
        self.services.purchase_orders.update_status(UpdateOrderStatus {
            order_id,
            status,
            occurred_at: at(120),
            actor: self.actor,
        })
    }

    pub fn stock(&self, product_id: ProductId) -> i64 {
        self.services.transactions.current_stock(product_id).unwrap()
    }
}
