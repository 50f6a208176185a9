use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockkeep_core::validate::optional_text;
use stockkeep_core::{
    DomainError, DomainResult, Entity, PurchaseOrderId, SupplierId, Versioned,
};

use crate::detail::OrderDetail;
use crate::status::PurchaseOrderStatus;
use crate::totals::OrderTotals;

/// Editable header fields of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub supplier_id: SupplierId,
    pub order_date: DateTime<Utc>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub notes: String,
}

impl OrderHeader {
    fn validate(&self) -> DomainResult<()> {
        optional_text("notes", &self.notes, PurchaseOrder::NOTES_MAX)?;
        if let Some(expected) = self.expected_delivery_date {
            if expected < self.order_date {
                return Err(DomainError::validation(
                    "expected delivery date cannot be earlier than order date",
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of a validated status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: PurchaseOrderStatus,
    pub to: PurchaseOrderStatus,
}

impl StatusChange {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// True only for the single transition that receives goods into stock.
    pub fn enters_delivered(&self) -> bool {
        self.to == PurchaseOrderStatus::Delivered && self.from != PurchaseOrderStatus::Delivered
    }
}

/// A purchase order header.
///
/// Lines are stored separately as [`OrderDetail`] rows owned by the order.
/// `total_amount` has no setter: it is recomputed from the line set on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    supplier_id: SupplierId,
    order_date: DateTime<Utc>,
    expected_delivery_date: Option<DateTime<Utc>>,
    delivery_date: Option<DateTime<Utc>>,
    status: PurchaseOrderStatus,
    total_amount: Decimal,
    notes: String,
    version: u64,
}

impl PurchaseOrder {
    pub const NOTES_MAX: usize = 500;

    /// Open a new order. Orders always start `Pending`.
    pub fn open(id: PurchaseOrderId, header: OrderHeader, details: &[OrderDetail]) -> DomainResult<Self> {
        header.validate()?;
        if details.is_empty() {
            return Err(DomainError::validation(
                "purchase order needs at least one line",
            ));
        }

        let mut order = Self {
            id,
            supplier_id: header.supplier_id,
            order_date: header.order_date,
            expected_delivery_date: header.expected_delivery_date,
            delivery_date: None,
            status: PurchaseOrderStatus::Pending,
            total_amount: Decimal::ZERO,
            notes: header.notes,
            version: 0,
        };
        order.recalculate_total(details)?;
        Ok(order)
    }

    /// Policy gate for edits and deletes.
    pub fn ensure_editable(&self) -> DomainResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(DomainError::edit_not_permitted(format!(
                "only pending orders can be changed; order {} is {}",
                self.id, self.status
            )))
        }
    }

    pub fn revise_header(&mut self, header: OrderHeader) -> DomainResult<()> {
        self.ensure_editable()?;
        header.validate()?;
        self.supplier_id = header.supplier_id;
        self.order_date = header.order_date;
        self.expected_delivery_date = header.expected_delivery_date;
        self.notes = header.notes;
        Ok(())
    }

    /// Move to `next`, stamping the delivery date when goods are received.
    ///
    /// The caller applies the stock side effect when the returned change
    /// [`enters_delivered`](StatusChange::enters_delivered).
    pub fn transition_to(
        &mut self,
        next: PurchaseOrderStatus,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<StatusChange> {
        self.status.ensure_transition(next)?;
        let change = StatusChange {
            from: self.status,
            to: next,
        };
        if change.enters_delivered() {
            self.delivery_date = Some(occurred_at);
        }
        self.status = next;
        Ok(change)
    }

    /// Recompute `total_amount` from the order's current detail set.
    pub fn recalculate_total(&mut self, details: &[OrderDetail]) -> DomainResult<Decimal> {
        if let Some(foreign) = details.iter().find(|d| d.order_id() != self.id) {
            return Err(DomainError::validation(format!(
                "order detail belongs to order {}, not {}",
                foreign.order_id(),
                self.id
            )));
        }
        self.total_amount = OrderTotals::calculate(details)?.total_amount;
        Ok(self.total_amount)
    }

    /// Snapshot stamped with a store-assigned version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn expected_delivery_date(&self) -> Option<DateTime<Utc>> {
        self.expected_delivery_date
    }

    pub fn delivery_date(&self) -> Option<DateTime<Utc>> {
        self.delivery_date
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> PurchaseOrderId {
        self.id
    }
}

impl Versioned for PurchaseOrder {
    fn version(&self) -> u64 {
        self.version
    }
}
