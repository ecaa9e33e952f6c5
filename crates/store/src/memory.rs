//! In-memory ledger store (dev mode and tests).

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use nestegg_core::OwnerId;
use nestegg_ledger::{Transaction, TransactionDraft, TransactionId};

use crate::error::StoreError;
use crate::store::LedgerStore;

/// Mutex-guarded vector with an atomic id counter. Each append is a single
/// locked push, so per-call atomicity and committed-only reads hold trivially.
#[derive(Debug, Default)]
pub struct MemLedgerStore {
    rows: Mutex<Vec<Transaction>>,
    next_id: AtomicI64,
}

impl MemLedgerStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn matching(&self, owner_id: OwnerId, account_name: Option<&str>) -> Vec<Transaction> {
        self.rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|t| {
                t.owner_id == owner_id
                    && account_name.is_none_or(|name| t.account_name == name)
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LedgerStore for MemLedgerStore {
    async fn append(&self, draft: TransactionDraft) -> Result<Transaction, StoreError> {
        let transaction = Transaction {
            id: TransactionId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            owner_id: draft.owner_id(),
            account_name: draft.account_name().to_string(),
            kind: draft.kind(),
            amount: draft.amount(),
            note: draft.note().map(str::to_string),
            occurred_at: draft.occurred_at(),
            recorded_at: Utc::now(),
        };
        self.rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(transaction.clone());
        Ok(transaction)
    }

    async fn list_for_owner(
        &self,
        owner_id: OwnerId,
        account_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut rows = self.matching(owner_id, account_name);
        rows.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn load_for_owner(
        &self,
        owner_id: OwnerId,
        account_name: Option<&str>,
    ) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.matching(owner_id, account_name))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
