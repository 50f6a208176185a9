//! Order total calculator.
//!
//! Totals are pure functions of the current line set and use fixed-point decimal
//! arithmetic with overflow checks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockkeep_core::{DomainError, DomainResult};

/// Anything priced as `quantity * unit_price`.
pub trait PricedLine {
    fn quantity(&self) -> i64;
    fn unit_price(&self) -> Decimal;
}

/// `quantity * unit_price`, exact.
pub fn line_total(quantity: i64, unit_price: Decimal) -> DomainResult<Decimal> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or_else(|| DomainError::validation("line total overflow"))
}

/// Per-line totals and their sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub line_totals: Vec<Decimal>,
    pub total_amount: Decimal,
}

impl OrderTotals {
    pub fn calculate<'a, L>(lines: impl IntoIterator<Item = &'a L>) -> DomainResult<Self>
    where
        L: PricedLine + 'a,
    {
        let mut line_totals = Vec::new();
        let mut total_amount = Decimal::ZERO;
        for line in lines {
            let t = line_total(line.quantity(), line.unit_price())?;
            total_amount = total_amount
                .checked_add(t)
                .ok_or_else(|| DomainError::validation("order total overflow"))?;
            line_totals.push(t);
        }
        Ok(Self {
            line_totals,
            total_amount,
        })
    }
}
