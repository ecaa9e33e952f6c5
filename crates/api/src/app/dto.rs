//! Request DTOs and JSON mapping helpers.
//!
//! Raw payloads are turned into validated domain inputs here, at the
//! boundary, before anything reaches the core.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use nestegg_core::{DomainError, Money, OwnerId};
use nestegg_ledger::{Transaction, TransactionDraft, TransactionKind};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    pub account_name: String,

    /// Amount as a string; thousands separators are tolerated.
    pub amount: String,

    /// `credit`/`debit`, or the legacy `add`/`subtract`.
    #[serde(alias = "transactionType")]
    pub kind: TransactionKind,

    #[serde(default)]
    pub note: Option<String>,

    /// When the transaction happened; RFC 3339 preferred. Unparsable values
    /// fall back to "now" rather than erroring.
    #[serde(default, alias = "dateTime")]
    pub occurred_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub account: Option<String>,
    pub limit: Option<i64>,
}

/// Default and ceiling for history page sizes.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 500;

// -------------------------
// Boundary conversion
// -------------------------

/// Build a validated draft from a raw request body.
pub fn to_draft(
    owner_id: OwnerId,
    req: RecordTransactionRequest,
    now: DateTime<Utc>,
) -> Result<TransactionDraft, DomainError> {
    let amount = Money::parse(&req.amount)?;
    let occurred_at = parse_occurred_at(req.occurred_at.as_deref(), now);
    TransactionDraft::new(owner_id, req.account_name, req.kind, amount, req.note, occurred_at)
}

/// Lenient timestamp parsing: RFC 3339, then the naive formats browsers
/// emit, then "now". A bad timestamp is not an error.
pub fn parse_occurred_at(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive.and_utc();
        }
    }

    tracing::debug!(raw, "unparsable occurred_at; falling back to now");
    now
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn transaction_to_json(t: &Transaction) -> serde_json::Value {
    serde_json::json!({
        "id": t.id.as_i64(),
        "accountName": t.account_name,
        "kind": t.kind.as_str(),
        "amount": t.amount.to_string(),
        "note": t.note,
        "occurredAt": t.occurred_at.to_rfc3339(),
        "recordedAt": t.recorded_at.to_rfc3339(),
    })
}

pub fn balances_to_json(
    balances: &std::collections::BTreeMap<String, nestegg_core::Money>,
) -> serde_json::Value {
    serde_json::Value::Object(
        balances
            .iter()
            .map(|(name, balance)| (name.clone(), serde_json::Value::String(balance.to_string())))
            .collect(),
    )
}
