//! Purchase order status state machine.

use serde::{Deserialize, Serialize};

use stockkeep_core::{DomainError, DomainResult};

/// Purchase order status lifecycle.
///
/// ```text
/// Pending ──► Shipped ──► Delivered
///    │           │
///    └──────┬────┘
///           ▼
///       Cancelled
/// ```
///
/// `Delivered` and `Cancelled` are terminal. Staying in the same state is always
/// allowed and changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub const ALL: [PurchaseOrderStatus; 4] = [
        PurchaseOrderStatus::Pending,
        PurchaseOrderStatus::Shipped,
        PurchaseOrderStatus::Delivered,
        PurchaseOrderStatus::Cancelled,
    ];

    /// States reachable in one step, excluding the self-transition.
    pub fn successors(self) -> &'static [PurchaseOrderStatus] {
        use PurchaseOrderStatus::*;
        match self {
            Pending => &[Shipped, Cancelled],
            Shipped => &[Delivered, Cancelled],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: PurchaseOrderStatus) -> bool {
        self == next || self.successors().contains(&next)
    }

    pub fn ensure_transition(self, next: PurchaseOrderStatus) -> DomainResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(self, next))
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Only pending orders may have their lines or dates changed, or be deleted.
    pub fn is_editable(self) -> bool {
        self == PurchaseOrderStatus::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "Pending",
            PurchaseOrderStatus::Shipped => "Shipped",
            PurchaseOrderStatus::Delivered => "Delivered",
            PurchaseOrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl core::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PurchaseOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown purchase order status '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PurchaseOrderStatus::*;

    #[test]
    fn transition_table_is_complete() {
        let allowed = [
            (Pending, Pending),
            (Pending, Shipped),
            (Pending, Cancelled),
            (Shipped, Shipped),
            (Shipped, Delivered),
            (Shipped, Cancelled),
            (Delivered, Delivered),
            (Cancelled, Cancelled),
        ];

        for from in PurchaseOrderStatus::ALL {
            for to in PurchaseOrderStatus::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
                match from.ensure_transition(to) {
                    Ok(()) => assert!(expected),
                    Err(DomainError::InvalidStatusTransition { from: f, to: t }) => {
                        assert!(!expected);
                        assert_eq!(f, from.as_str());
                        assert_eq!(t, to.as_str());
                    }
                    Err(other) => panic!("unexpected error {other:?}"),
                }
            }
        }
    }

    #[test]
    fn only_pending_is_editable_and_terminals_have_no_successors() {
        assert!(Pending.is_editable());
        assert!(!Shipped.is_editable());
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Shipped.is_terminal());
    }

    #[test]
    fn parses_status_names() {
        assert_eq!("delivered".parse::<PurchaseOrderStatus>().unwrap(), Delivered);
        assert!("Lost".parse::<PurchaseOrderStatus>().is_err());
    }
}
