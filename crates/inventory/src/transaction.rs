use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockkeep_core::validate::{optional_text, positive_quantity, required_text};
use stockkeep_core::{DomainError, DomainResult, Entity, ProductId, TransactionId, UserId};

/// Direction of a manual stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl TransactionType {
    /// Signed stock delta for `quantity` units moving in this direction.
    pub fn signed(self, quantity: i64) -> i64 {
        match self {
            TransactionType::In => quantity,
            TransactionType::Out => -quantity,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(TransactionType::In),
            "OUT" => Ok(TransactionType::Out),
            other => Err(DomainError::validation(format!(
                "transaction type must be IN or OUT, got '{other}'"
            ))),
        }
    }
}

/// Input for recording (or revising) a manual stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTransaction {
    pub product_id: ProductId,
    pub kind: TransactionType,
    pub quantity: i64,
    pub reason: String,
    pub reference_number: String,
    pub occurred_at: DateTime<Utc>,
    pub actor: UserId,
}

impl RecordTransaction {
    pub fn signed_delta(&self) -> i64 {
        self.kind.signed(self.quantity)
    }

    fn validate(&self) -> DomainResult<()> {
        positive_quantity("quantity", self.quantity)?;
        optional_text("reason", &self.reason, InventoryTransaction::REASON_MAX)?;
        required_text(
            "reference number",
            &self.reference_number,
            InventoryTransaction::REFERENCE_MAX,
        )
    }
}

/// A recorded manual stock movement.
///
/// `sequence` is assigned by the store on insert and breaks ties between
/// transactions sharing a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    id: TransactionId,
    product_id: ProductId,
    kind: TransactionType,
    quantity: i64,
    reason: String,
    reference_number: String,
    occurred_at: DateTime<Utc>,
    recorded_by: UserId,
    sequence: u64,
}

impl InventoryTransaction {
    pub const REASON_MAX: usize = 200;
    pub const REFERENCE_MAX: usize = 50;

    pub fn record(id: TransactionId, input: RecordTransaction) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            product_id: input.product_id,
            kind: input.kind,
            quantity: input.quantity,
            reason: input.reason,
            reference_number: input.reference_number,
            occurred_at: input.occurred_at,
            recorded_by: input.actor,
            sequence: 0,
        })
    }

    /// Replacement record for an edit. Identity and insertion order are kept.
    pub fn revise(&self, input: RecordTransaction) -> DomainResult<Self> {
        let revised = Self::record(self.id, input)?;
        Ok(Self {
            sequence: self.sequence,
            ..revised
        })
    }

    /// Snapshot stamped with a store-assigned insertion sequence.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn reference_number(&self) -> &str {
        &self.reference_number
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn recorded_by(&self) -> UserId {
        self.recorded_by
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// `+quantity` for IN, `-quantity` for OUT.
    pub fn signed_delta(&self) -> i64 {
        self.kind.signed(self.quantity)
    }
}

impl Entity for InventoryTransaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }
}
