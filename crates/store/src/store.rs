use async_trait::async_trait;

use nestegg_core::OwnerId;
use nestegg_ledger::{Transaction, TransactionDraft};

use crate::error::StoreError;

/// Append-only, owner-scoped transaction store.
///
/// ## Append semantics
///
/// `append` persists one validated draft atomically (all-or-nothing) and
/// returns the stored row with its store-assigned, monotonically increasing
/// id and `recorded_at` timestamp. Appends from overlapping requests need no
/// ordering guarantee beyond each being individually durable.
///
/// ## Read semantics
///
/// Reads observe a consistent snapshot of already-committed transactions —
/// never a partially written row. `list_for_owner` orders newest
/// `occurred_at` first and bounds the result size; `load_for_owner` returns
/// the full history for balance derivation.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Durably append one transaction.
    async fn append(&self, draft: TransactionDraft) -> Result<Transaction, StoreError>;

    /// List transactions for an owner, optionally filtered to one account,
    /// newest `occurred_at` first, at most `limit` rows.
    async fn list_for_owner(
        &self,
        owner_id: OwnerId,
        account_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Load the full matching history (for balance recomputation).
    async fn load_for_owner(
        &self,
        owner_id: OwnerId,
        account_name: Option<&str>,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Cheap liveness probe, used by the periodic keep-alive task.
    async fn ping(&self) -> Result<(), StoreError>;
}
