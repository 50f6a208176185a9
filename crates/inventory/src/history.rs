//! Replay of a product's manual transactions into a running-balance series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockkeep_core::{Entity, ProductId, TransactionId};

use crate::transaction::InventoryTransaction;

/// One step of a replayed history.
///
/// Balances are `i128`: the fold starts at zero rather than at real stock, so a
/// reordered series of valid `i64` movements can leave the `i64` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub transaction_id: TransactionId,
    pub occurred_at: DateTime<Utc>,
    pub signed_delta: i64,
    pub balance_before: i128,
    pub balance_after: i128,
}

/// Ordered transaction history for one product.
///
/// Ordering is ascending by timestamp, then by store insertion sequence. The balance
/// fold always starts at zero, independent of the product's live stock, so deliveries
/// and initial stock are not part of this series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockHistory {
    product_id: ProductId,
    transactions: Vec<InventoryTransaction>,
}

impl StockHistory {
    /// Build a history from any set of transactions; ones for other products are ignored.
    pub fn replay(
        product_id: ProductId,
        transactions: impl IntoIterator<Item = InventoryTransaction>,
    ) -> Self {
        let mut transactions: Vec<_> = transactions
            .into_iter()
            .filter(|t| t.product_id() == product_id)
            .collect();
        transactions.sort_by_key(|t| (t.occurred_at(), t.sequence()));

        Self {
            product_id,
            transactions,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Lazily fold the series. Each call starts over from balance zero.
    pub fn iter(&self) -> HistoryIter<'_> {
        HistoryIter {
            inner: self.transactions.iter(),
            balance: 0,
        }
    }

    /// Balance after the last replayed transaction.
    pub fn final_balance(&self) -> i128 {
        self.transactions
            .iter()
            .map(|t| i128::from(t.signed_delta()))
            .sum()
    }
}

impl<'a> IntoIterator for &'a StockHistory {
    type Item = HistoryEntry;
    type IntoIter = HistoryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`HistoryEntry`] values, see [`StockHistory::iter`].
#[derive(Debug, Clone)]
pub struct HistoryIter<'a> {
    inner: core::slice::Iter<'a, InventoryTransaction>,
    balance: i128,
}

impl Iterator for HistoryIter<'_> {
    type Item = HistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.inner.next()?;
        let balance_before = self.balance;
        // At most `len` steps of magnitude <= i64::MAX each; cannot overflow i128.
        self.balance += i128::from(t.signed_delta());
        Some(HistoryEntry {
            transaction_id: t.id(),
            occurred_at: t.occurred_at(),
            signed_delta: t.signed_delta(),
            balance_before,
            balance_after: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for HistoryIter<'_> {}

impl core::iter::FusedIterator for HistoryIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{RecordTransaction, TransactionType};
    use chrono::TimeZone;
    use stockkeep_core::UserId;

    fn tx(
        product_id: ProductId,
        kind: TransactionType,
        quantity: i64,
        minute: u32,
        sequence: u64,
    ) -> InventoryTransaction {
        InventoryTransaction::record(
            TransactionId::new(),
            RecordTransaction {
                product_id,
                kind,
                quantity,
                reason: String::new(),
                reference_number: format!("R-{sequence}"),
                occurred_at: Utc.with_ymd_and_hms(2024, 12, 11, 9, minute, 0).unwrap(),
                actor: UserId::new(),
            },
        )
        .unwrap()
        .with_sequence(sequence)
    }

    #[test]
    fn replays_in_timestamp_order_from_zero() {
        let p = ProductId::new();
        let h = StockHistory::replay(
            p,
            vec![
                tx(p, TransactionType::Out, 5, 30, 3),
                tx(p, TransactionType::In, 20, 10, 1),
                tx(p, TransactionType::In, 3, 20, 2),
            ],
        );

        let balances: Vec<_> = h.iter().map(|e| (e.balance_before, e.balance_after)).collect();
        assert_eq!(balances, vec![(0, 20), (20, 23), (23, 18)]);
        assert_eq!(h.final_balance(), 18);
    }

    #[test]
    fn equal_timestamps_fall_back_to_insertion_sequence() {
        let p = ProductId::new();
        let first = tx(p, TransactionType::In, 1, 0, 1);
        let second = tx(p, TransactionType::In, 2, 0, 2);
        let h = StockHistory::replay(p, vec![second.clone(), first.clone()]);

        let ids: Vec<_> = h.iter().map(|e| e.transaction_id).collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
    }

    #[test]
    fn ignores_other_products_and_is_restartable() {
        let p = ProductId::new();
        let other = ProductId::new();
        let h = StockHistory::replay(
            p,
            vec![tx(p, TransactionType::In, 4, 1, 1), tx(other, TransactionType::In, 99, 2, 2)],
        );

        assert_eq!(h.len(), 1);
        let first_pass: Vec<_> = h.iter().collect();
        let second_pass: Vec<_> = (&h).into_iter().collect();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn replay_may_dip_below_zero() {
        // Initial stock is not part of the series, so OUT-first histories go negative.
        let p = ProductId::new();
        let h = StockHistory::replay(p, vec![tx(p, TransactionType::Out, 3, 0, 1)]);
        let e = h.iter().next().unwrap();
        assert_eq!(e.balance_after, -3);
    }

    #[test]
    fn extreme_quantities_replay_without_overflow() {
        // Dated out of recording order: the replay visits IN, IN, OUT.
        let p = ProductId::new();
        let h = StockHistory::replay(
            p,
            vec![
                tx(p, TransactionType::In, i64::MAX, 10, 1),
                tx(p, TransactionType::Out, i64::MAX, 20, 2),
                tx(p, TransactionType::In, i64::MAX, 5, 3),
            ],
        );

        let max = i128::from(i64::MAX);
        let balances: Vec<_> = h.iter().map(|e| e.balance_after).collect();
        assert_eq!(balances, vec![max, 2 * max, max]);
        assert_eq!(h.final_balance(), max);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the last running balance equals the sum of signed deltas.
            #[test]
            fn final_entry_matches_sum(moves in proptest::collection::vec((any::<bool>(), 1i64..500, 0u32..59), 0..40)) {
                let p = ProductId::new();
                let txs: Vec<_> = moves
                    .iter()
                    .enumerate()
                    .map(|(i, (is_in, q, m))| {
                        let kind = if *is_in { TransactionType::In } else { TransactionType::Out };
                        tx(p, kind, *q, *m, i as u64 + 1)
                    })
                    .collect();
                let expected: i128 = txs.iter().map(|t| i128::from(t.signed_delta())).sum();
                let h = StockHistory::replay(p, txs);
                let last = h.iter().last().map(|e| e.balance_after).unwrap_or(0);
                prop_assert_eq!(last, expected);
                prop_assert_eq!(h.final_balance(), expected);
            }
        }
    }
}
