//! Manual stock movements: record, edit, inspect.

use serde::Serialize;
use tracing::{info, instrument};

use stockkeep_core::{DomainResult, Entity, ProductId, TransactionId};
use stockkeep_inventory::{
    InventoryTransaction, RecordTransaction, StockHistory, StockMovement, StockWindow,
};
use stockkeep_products::Product;

use crate::ledger;
use crate::store::{Store, UnitOfWork};
use crate::unit_of_work::{self, RetryPolicy};

/// Result of recording a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub transaction: InventoryTransaction,
    pub movement: StockMovement,
}

/// Result of editing a transaction: the undo of the old delta, then the new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditReceipt {
    pub transaction: InventoryTransaction,
    pub reverted: StockMovement,
    pub applied: StockMovement,
}

/// A transaction with both stock views of its product.
///
/// `window` is derived from live stock, `history` from a replay of manual
/// transactions starting at zero. They are independent and may disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    pub transaction: InventoryTransaction,
    pub product: Product,
    pub window: StockWindow,
    pub history: StockHistory,
}

#[derive(Debug, Clone)]
pub struct InventoryTransactionService<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: Store> InventoryTransactionService<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Record a movement and apply it to stock in one unit of work.
    ///
    /// On `InsufficientStock` nothing is written.
    #[instrument(
        skip(self, input),
        fields(
            product_id = %input.product_id,
            kind = %input.kind,
            quantity = input.quantity,
            actor = %input.actor,
        ),
        err
    )]
    pub fn create(&self, input: RecordTransaction) -> DomainResult<TransactionReceipt> {
        let transaction = InventoryTransaction::record(TransactionId::new(), input)?;

        let receipt = unit_of_work::execute(&self.store, self.policy, |scope| {
            let movement = ledger::apply_delta(
                scope,
                transaction.product_id(),
                transaction.signed_delta(),
            )?;
            let transaction = scope.insert_inventory_transaction(transaction.clone())?;
            Ok(TransactionReceipt {
                transaction,
                movement,
            })
        })?;

        info!(
            transaction_id = %receipt.transaction.id(),
            stock_after = receipt.movement.stock_after,
            "inventory transaction recorded"
        );
        Ok(receipt)
    }

    /// Replace a transaction's product, type, quantity and metadata.
    ///
    /// The original delta is undone on the original product, then the new delta is
    /// applied to the (possibly different) product. Either step failing leaves every
    /// product untouched.
    #[instrument(
        skip(self, input),
        fields(
            transaction_id = %transaction_id,
            product_id = %input.product_id,
            kind = %input.kind,
            quantity = input.quantity,
            actor = %input.actor,
        ),
        err
    )]
    pub fn edit(
        &self,
        transaction_id: TransactionId,
        input: RecordTransaction,
    ) -> DomainResult<EditReceipt> {
        let receipt = unit_of_work::execute(&self.store, self.policy, |scope| {
            let original = scope.get_transaction(transaction_id)?;
            let revised = original.revise(input.clone())?;

            let reverted = ledger::apply_delta(
                scope,
                original.product_id(),
                -original.signed_delta(),
            )?;
            let applied =
                ledger::apply_delta(scope, revised.product_id(), revised.signed_delta())?;
            scope.update_inventory_transaction(revised.clone())?;

            Ok(EditReceipt {
                transaction: revised,
                reverted,
                applied,
            })
        })?;

        info!(
            reverted_on = %receipt.reverted.product_id,
            applied_on = %receipt.applied.product_id,
            "inventory transaction edited"
        );
        Ok(receipt)
    }

    #[instrument(skip(self), err)]
    pub fn details(&self, transaction_id: TransactionId) -> DomainResult<TransactionDetails> {
        unit_of_work::read(&self.store, |scope| {
            let transaction = scope.get_transaction(transaction_id)?;
            let product = scope.get_product(transaction.product_id())?;
            let window = StockWindow::from_current_stock(&transaction, product.current_stock());
            let history = ledger::history(scope, product.id())?;
            Ok(TransactionDetails {
                transaction,
                product,
                window,
                history,
            })
        })
    }

    /// Replayed manual-transaction history of a product.
    #[instrument(skip(self), err)]
    pub fn history(&self, product_id: ProductId) -> DomainResult<StockHistory> {
        unit_of_work::read(&self.store, |scope| ledger::history(scope, product_id))
    }

    #[instrument(skip(self), err)]
    pub fn current_stock(&self, product_id: ProductId) -> DomainResult<i64> {
        unit_of_work::read(&self.store, |scope| {
            Ok(scope.get_product(product_id)?.current_stock())
        })
    }

    pub fn get(&self, transaction_id: TransactionId) -> DomainResult<InventoryTransaction> {
        unit_of_work::read(&self.store, |scope| Ok(scope.get_transaction(transaction_id)?))
    }
}
