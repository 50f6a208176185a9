//! The single gateway through which `current_stock` changes.
//!
//! Manual transactions, transaction edits and purchase-order deliveries all call
//! [`apply_delta`]. It reads the product inside the caller's unit of work, checks the
//! non-negative invariant, and writes the new level guarded by the version it read.

use tracing::debug;

use stockkeep_core::{DomainResult, ExpectedVersion, ProductId, Versioned};
use stockkeep_inventory::{StockHistory, StockMovement};
use stockkeep_purchasing::OrderDetail;

use crate::store::UnitOfWork;

/// Apply a signed stock delta to one product.
pub fn apply_delta<U>(scope: &mut U, product_id: ProductId, signed_delta: i64) -> DomainResult<StockMovement>
where
    U: UnitOfWork + ?Sized,
{
    let product = scope.get_product(product_id)?;
    let movement = StockMovement::compute(product_id, product.current_stock(), signed_delta)?;
    scope.update_product_stock(
        product_id,
        movement.stock_after,
        ExpectedVersion::Exact(product.version()),
    )?;

    debug!(
        product_id = %product_id,
        before = movement.stock_before,
        after = movement.stock_after,
        "stock level changed"
    );
    Ok(movement)
}

/// Receive every line of a delivered purchase order into stock.
pub fn receive_goods<U>(scope: &mut U, details: &[OrderDetail]) -> DomainResult<Vec<StockMovement>>
where
    U: UnitOfWork + ?Sized,
{
    details
        .iter()
        .map(|d| apply_delta(&mut *scope, d.product_id(), d.quantity()))
        .collect()
}

/// Replay the manual transactions of an existing product.
pub fn history<U>(scope: &U, product_id: ProductId) -> DomainResult<StockHistory>
where
    U: UnitOfWork + ?Sized,
{
    scope.get_product(product_id)?;
    Ok(StockHistory::replay(
        product_id,
        scope.transactions_for_product(product_id)?,
    ))
}
