use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nestegg_core::{DomainError, DomainResult, Money, OwnerId};

/// Store-assigned transaction identifier (monotonically increasing).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl TransactionId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of money movement.
///
/// Credit increases and Debit decreases the derived balance. Direction is
/// carried here, never by the sign of the amount. The legacy wire names
/// `add`/`subtract` are accepted as input aliases.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "add")]
    Credit,
    #[serde(alias = "subtract")]
    Debit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "credit" | "add" => Ok(TransactionKind::Credit),
            "debit" | "subtract" => Ok(TransactionKind::Debit),
            other => Err(DomainError::validation(format!(
                "kind must be credit or debit, got {other:?}"
            ))),
        }
    }
}

/// One recorded money movement (immutable once created).
///
/// # Invariants
/// - `amount` is strictly positive; `kind` alone carries direction.
/// - `occurred_at` is when the movement happened (caller-supplied or
///   defaulted); `recorded_at` is when the store accepted the row.
/// - Transactions are never mutated or deleted; balances are always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: OwnerId,
    pub account_name: String,
    pub kind: TransactionKind,
    pub amount: Money,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    /// The amount this transaction contributes to a balance, in cents.
    pub fn signed_cents(&self) -> i64 {
        match self.kind {
            TransactionKind::Credit => self.amount.as_cents(),
            TransactionKind::Debit => -self.amount.as_cents(),
        }
    }
}

/// A validated transaction awaiting persistence.
///
/// Constructed at the boundary from raw request input; once a draft exists
/// its invariants hold (positive amount, non-blank account name). The store
/// assigns the id and `recorded_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    owner_id: OwnerId,
    account_name: String,
    kind: TransactionKind,
    amount: Money,
    note: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl TransactionDraft {
    pub fn new(
        owner_id: OwnerId,
        account_name: impl Into<String>,
        kind: TransactionKind,
        amount: Money,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let account_name = account_name.into().trim().to_string();
        if account_name.is_empty() {
            return Err(DomainError::validation("account name is required"));
        }
        if !amount.is_positive() {
            return Err(DomainError::invalid_amount(
                "amount must be greater than zero",
            ));
        }
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            owner_id,
            account_name,
            kind,
            amount,
            note,
            occurred_at,
        })
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
