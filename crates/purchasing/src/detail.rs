use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockkeep_core::validate::positive_quantity;
use stockkeep_core::{DomainError, DomainResult, Entity, OrderDetailId, ProductId, PurchaseOrderId};

use crate::totals::{line_total, PricedLine};

/// Requested line of a purchase order (caller input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn validate(&self) -> DomainResult<()> {
        positive_quantity("line quantity", self.quantity)?;
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("line unit price cannot be negative"));
        }
        line_total(self.quantity, self.unit_price).map(|_| ())
    }
}

impl PricedLine for OrderLine {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

/// Stored purchase order line.
///
/// `unit_price` is a snapshot taken when the line was written and does not follow
/// later product price changes. `total_price` is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderDetailRecord")]
pub struct OrderDetail {
    id: OrderDetailId,
    order_id: PurchaseOrderId,
    product_id: ProductId,
    quantity: i64,
    unit_price: Decimal,
}

impl OrderDetail {
    pub fn from_line(id: OrderDetailId, order_id: PurchaseOrderId, line: &OrderLine) -> DomainResult<Self> {
        line.validate()?;
        Ok(Self {
            id,
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
    }

    pub fn order_id(&self) -> PurchaseOrderId {
        self.order_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_price(&self) -> Decimal {
        // `from_line` is the only constructor (deserializing included) and it
        // rejects lines whose total overflows.
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Deserialize)]
struct OrderDetailRecord {
    id: OrderDetailId,
    order_id: PurchaseOrderId,
    product_id: ProductId,
    quantity: i64,
    unit_price: Decimal,
}

impl TryFrom<OrderDetailRecord> for OrderDetail {
    type Error = DomainError;

    fn try_from(r: OrderDetailRecord) -> DomainResult<Self> {
        let line = OrderLine {
            product_id: r.product_id,
            quantity: r.quantity,
            unit_price: r.unit_price,
        };
        Self::from_line(r.id, r.order_id, &line)
    }
}

impl PricedLine for OrderDetail {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl Entity for OrderDetail {
    type Id = OrderDetailId;

    fn id(&self) -> OrderDetailId {
        self.id
    }
}
