//! Purchase order lifecycle: create, edit, status changes, delete.
//!
//! Goods are received into stock exactly once, on the first transition into
//! `Delivered`, inside the same unit of work as the status write. The order row's
//! version guards that write, so two racing deliveries cannot both commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use stockkeep_core::{
    DomainError, DomainResult, Entity, ExpectedVersion, OrderDetailId, PurchaseOrderId,
    SupplierId, UserId, Versioned,
};
use stockkeep_inventory::StockMovement;
use stockkeep_purchasing::{
    OrderDetail, OrderHeader, OrderLine, PurchaseOrder, PurchaseOrderStatus, StatusChange,
};

use crate::ledger;
use crate::store::{Store, UnitOfWork};
use crate::unit_of_work::{self, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub header: OrderHeader,
    pub lines: Vec<OrderLine>,
    pub actor: UserId,
}

/// Full replacement of a pending order: header, target status and line set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPurchaseOrder {
    pub order_id: PurchaseOrderId,
    pub header: OrderHeader,
    pub status: PurchaseOrderStatus,
    pub lines: Vec<OrderLine>,
    pub occurred_at: DateTime<Utc>,
    pub actor: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderStatus {
    pub order_id: PurchaseOrderId,
    pub status: PurchaseOrderStatus,
    pub occurred_at: DateTime<Utc>,
    pub actor: UserId,
}

/// An order with its detail lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderView {
    pub order: PurchaseOrder,
    pub details: Vec<OrderDetail>,
}

/// Outcome of a status change or edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    pub order: PurchaseOrder,
    pub change: StatusChange,
    /// Stock movements made by receiving goods; empty unless the order was delivered.
    pub received: Vec<StockMovement>,
}

#[derive(Debug, Clone)]
pub struct PurchaseOrderService<S> {
    store: S,
    policy: RetryPolicy,
}

fn require_active_supplier<U>(scope: &U, supplier_id: SupplierId) -> DomainResult<()>
where
    U: UnitOfWork + ?Sized,
{
    let supplier = scope.get_supplier(supplier_id)?;
    if supplier.is_active() {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "supplier {supplier_id} is inactive"
        )))
    }
}

/// Validate lines against the catalog and turn them into detail rows for `order_id`.
fn build_details<U>(
    scope: &U,
    order_id: PurchaseOrderId,
    lines: &[OrderLine],
) -> DomainResult<Vec<OrderDetail>>
where
    U: UnitOfWork + ?Sized,
{
    if lines.is_empty() {
        return Err(DomainError::validation(
            "purchase order needs at least one line",
        ));
    }
    lines
        .iter()
        .map(|line| {
            scope.get_product(line.product_id)?;
            OrderDetail::from_line(OrderDetailId::new(), order_id, line)
        })
        .collect()
}

impl<S: Store> PurchaseOrderService<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    #[instrument(
        skip(self, input),
        fields(
            supplier_id = %input.header.supplier_id,
            lines = input.lines.len(),
            actor = %input.actor,
        ),
        err
    )]
    pub fn create(&self, input: CreatePurchaseOrder) -> DomainResult<PurchaseOrderView> {
        let order_id = PurchaseOrderId::new();

        let view = unit_of_work::execute(&self.store, self.policy, |scope| {
            require_active_supplier(scope, input.header.supplier_id)?;
            let details = build_details(scope, order_id, &input.lines)?;
            let order = PurchaseOrder::open(order_id, input.header.clone(), &details)?;

            scope.insert_order(order.clone())?;
            for detail in &details {
                scope.insert_order_detail(detail.clone())?;
            }
            Ok(PurchaseOrderView { order, details })
        })?;

        info!(
            order_id = %view.order.id(),
            total_amount = %view.order.total_amount(),
            "purchase order created"
        );
        Ok(view)
    }

    /// Replace a pending order's header and lines, optionally changing its status.
    ///
    /// Existing detail rows are deleted and the new set inserted; the total is
    /// recomputed from the new set, and so are any stock receipts.
    #[instrument(
        skip(self, input),
        fields(order_id = %input.order_id, status = %input.status, actor = %input.actor),
        err
    )]
    pub fn edit(&self, input: EditPurchaseOrder) -> DomainResult<OrderUpdate> {
        let update = unit_of_work::execute(&self.store, self.policy, |scope| {
            let mut order = scope.get_order(input.order_id)?;
            let expected = ExpectedVersion::Exact(order.version());
            order.ensure_editable()?;

            if input.header.supplier_id != order.supplier_id() {
                require_active_supplier(scope, input.header.supplier_id)?;
            }
            order.revise_header(input.header.clone())?;

            let details = build_details(scope, order.id(), &input.lines)?;
            scope.delete_order_details(order.id())?;
            for detail in &details {
                scope.insert_order_detail(detail.clone())?;
            }
            order.recalculate_total(&details)?;

            let change = order.transition_to(input.status, input.occurred_at)?;
            let received = if change.enters_delivered() {
                ledger::receive_goods(scope, &details)?
            } else {
                Vec::new()
            };

            let version = scope.update_order(order.clone(), expected)?;
            Ok(OrderUpdate {
                order: order.with_version(version),
                change,
                received,
            })
        })?;

        info!(
            total_amount = %update.order.total_amount(),
            status = %update.order.status(),
            "purchase order edited"
        );
        Ok(update)
    }

    /// Move an order along the status state machine.
    ///
    /// Re-asserting the current status is accepted and changes nothing.
    #[instrument(
        skip(self, input),
        fields(order_id = %input.order_id, status = %input.status, actor = %input.actor),
        err
    )]
    pub fn update_status(&self, input: UpdateOrderStatus) -> DomainResult<OrderUpdate> {
        let update = unit_of_work::execute(&self.store, self.policy, |scope| {
            let mut order = scope.get_order(input.order_id)?;
            let expected = ExpectedVersion::Exact(order.version());
            let change = order.transition_to(input.status, input.occurred_at)?;
            if change.is_noop() {
                return Ok(OrderUpdate {
                    order,
                    change,
                    received: Vec::new(),
                });
            }

            let received = if change.enters_delivered() {
                let details = scope.order_details(order.id())?;
                ledger::receive_goods(scope, &details)?
            } else {
                Vec::new()
            };

            let version = scope.update_order(order.clone(), expected)?;
            Ok(OrderUpdate {
                order: order.with_version(version),
                change,
                received,
            })
        })?;

        if !update.change.is_noop() {
            info!(
                from = %update.change.from,
                to = %update.change.to,
                lines_received = update.received.len(),
                "purchase order status changed"
            );
        }
        Ok(update)
    }

    /// Delete a pending order together with its detail lines.
    #[instrument(skip(self, actor), fields(actor = %actor), err)]
    pub fn delete(&self, order_id: PurchaseOrderId, actor: UserId) -> DomainResult<()> {
        unit_of_work::execute(&self.store, self.policy, |scope| {
            let order = scope.get_order(order_id)?;
            order.ensure_editable()?;
            scope.delete_order(order_id, ExpectedVersion::Exact(order.version()))?;
            Ok(())
        })?;
        info!("purchase order deleted");
        Ok(())
    }

    pub fn get(&self, order_id: PurchaseOrderId) -> DomainResult<PurchaseOrderView> {
        unit_of_work::read(&self.store, |scope| {
            Ok(PurchaseOrderView {
                order: scope.get_order(order_id)?,
                details: scope.order_details(order_id)?,
            })
        })
    }

    pub fn list(&self) -> DomainResult<Vec<PurchaseOrder>> {
        unit_of_work::read(&self.store, |scope| Ok(scope.list_orders()?))
    }
}
