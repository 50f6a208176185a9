//! Stock arithmetic shared by every path that changes `current_stock`.

use serde::{Deserialize, Serialize};

use stockkeep_core::{DomainError, DomainResult, ProductId};

use crate::transaction::InventoryTransaction;

/// Before/after stock of one applied delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub product_id: ProductId,
    pub stock_before: i64,
    pub stock_after: i64,
}

impl StockMovement {
    /// Compute the result of applying `signed_delta` to `stock_before`.
    ///
    /// Fails with `InsufficientStock` when the result would be negative; the
    /// reported `requested` is the magnitude of the decrease.
    pub fn compute(product_id: ProductId, stock_before: i64, signed_delta: i64) -> DomainResult<Self> {
        let stock_after = stock_before
            .checked_add(signed_delta)
            .ok_or_else(|| DomainError::validation("stock level overflow"))?;

        if stock_after < 0 {
            return Err(DomainError::insufficient_stock(
                product_id,
                signed_delta.saturating_neg(),
                stock_before,
            ));
        }

        Ok(Self {
            product_id,
            stock_before,
            stock_after,
        })
    }

    pub fn delta(&self) -> i64 {
        self.stock_after - self.stock_before
    }
}

/// Point-in-time before/after view of a single transaction.
///
/// Derived from the product's *live* stock, not from a replay: `before` is what the
/// stock would be with this one transaction reversed. When other movements happened
/// after it (later transactions, deliveries, edits) this disagrees with the replayed
/// [`crate::StockHistory`]; callers show both rather than reconciling them.
///
/// Values are `i128` since reversing a large OUT from large live stock can exceed
/// `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockWindow {
    pub stock_before: i128,
    pub stock_after: i128,
}

impl StockWindow {
    pub fn from_current_stock(transaction: &InventoryTransaction, current_stock: i64) -> Self {
        let current = i128::from(current_stock);
        Self {
            stock_before: current - i128::from(transaction.signed_delta()),
            stock_after: current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{RecordTransaction, TransactionType};
    use chrono::Utc;
    use stockkeep_core::{TransactionId, UserId};

    #[test]
    fn increase_and_decrease() {
        let p = ProductId::new();
        let m = StockMovement::compute(p, 10, 20).unwrap();
        assert_eq!((m.stock_before, m.stock_after, m.delta()), (10, 30, 20));

        let m = StockMovement::compute(p, 30, -30).unwrap();
        assert_eq!(m.stock_after, 0);
    }

    #[test]
    fn going_negative_reports_requested_and_available() {
        let p = ProductId::new();
        let err = StockMovement::compute(p, 5, -10).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(p, 10, 5));
    }

    #[test]
    fn window_reverses_own_delta_from_live_stock() {
        let tx = InventoryTransaction::record(
            TransactionId::new(),
            RecordTransaction {
                product_id: ProductId::new(),
                kind: TransactionType::Out,
                quantity: 4,
                reason: String::new(),
                reference_number: "R".to_string(),
                occurred_at: Utc::now(),
                actor: UserId::new(),
            },
        )
        .unwrap();

        let w = StockWindow::from_current_stock(&tx, 6);
        assert_eq!((w.stock_before, w.stock_after), (10, 6));
    }

    #[test]
    fn window_of_large_outbound_does_not_overflow() {
        let tx = InventoryTransaction::record(
            TransactionId::new(),
            RecordTransaction {
                product_id: ProductId::new(),
                kind: TransactionType::Out,
                quantity: 1,
                reason: String::new(),
                reference_number: "R".to_string(),
                occurred_at: Utc::now(),
                actor: UserId::new(),
            },
        )
        .unwrap();

        let w = StockWindow::from_current_stock(&tx, i64::MAX);
        assert_eq!(w.stock_before, i128::from(i64::MAX) + 1);
        assert_eq!(w.stock_after, i128::from(i64::MAX));
    }
}
