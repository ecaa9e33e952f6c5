//! Postgres-backed ledger store.
//!
//! ## Thread safety
//!
//! Uses the SQLx connection pool, which is `Send + Sync`; each append is a
//! single `INSERT` and therefore atomic per call.
//!
//! ## Owner isolation
//!
//! Every query includes `owner_id` in the WHERE clause, so one owner's rows
//! can never leak into another's reads even if a second owner ever appears.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use nestegg_core::{Money, OwnerId};
use nestegg_ledger::{Transaction, TransactionDraft, TransactionId, TransactionKind};

use crate::error::StoreError;
use crate::store::LedgerStore;

#[derive(Debug)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database. Failure to establish the pool is reported as
    /// [`StoreError::Unavailable`]; queries on a live pool report
    /// [`StoreError::Db`].
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if absent. Idempotent; called at startup.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS owners (
                id UUID PRIMARY KEY,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id BIGSERIAL PRIMARY KEY,
                owner_id UUID NOT NULL REFERENCES owners(id),
                account_name TEXT NOT NULL,
                kind TEXT NOT NULL,
                amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
                note TEXT,
                occurred_at TIMESTAMPTZ NOT NULL,
                recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_owner_account \
             ON transactions (owner_id, account_name)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_owner_occurred \
             ON transactions (owner_id, occurred_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Return the single owner's id, creating the row on first run.
    pub async fn ensure_owner(&self) -> Result<OwnerId, StoreError> {
        if let Some(row) = sqlx::query("SELECT id FROM owners ORDER BY created_at LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
        {
            let id: uuid::Uuid = row.try_get("id")?;
            return Ok(OwnerId::from_uuid(id));
        }

        let owner_id = OwnerId::new();
        sqlx::query("INSERT INTO owners (id) VALUES ($1)")
            .bind(owner_id.as_uuid())
            .execute(&self.pool)
            .await?;
        tracing::info!(owner_id = %owner_id, "created owner record");
        Ok(owner_id)
    }
}

fn row_to_transaction(row: &PgRow) -> Result<Transaction, StoreError> {
    let kind_raw: String = row.try_get("kind")?;
    let kind = TransactionKind::parse(&kind_raw)
        .map_err(|e| StoreError::Corrupt(format!("transaction kind: {e}")))?;

    Ok(Transaction {
        id: TransactionId(row.try_get("id")?),
        owner_id: OwnerId::from_uuid(row.try_get("owner_id")?),
        account_name: row.try_get("account_name")?,
        kind,
        amount: Money::from_cents(row.try_get("amount_cents")?),
        note: row.try_get("note")?,
        occurred_at: row.try_get("occurred_at")?,
        recorded_at: row.try_get("recorded_at")?,
    })
}

const TRANSACTION_COLUMNS: &str =
    "id, owner_id, account_name, kind, amount_cents, note, occurred_at, recorded_at";

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn append(&self, draft: TransactionDraft) -> Result<Transaction, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO transactions \
             (owner_id, account_name, kind, amount_cents, note, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(draft.owner_id().as_uuid())
        .bind(draft.account_name())
        .bind(draft.kind().as_str())
        .bind(draft.amount().as_cents())
        .bind(draft.note())
        .bind(draft.occurred_at())
        .fetch_one(&self.pool)
        .await?;

        row_to_transaction(&row)
    }

    async fn list_for_owner(
        &self,
        owner_id: OwnerId,
        account_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE owner_id = $1 AND ($2::TEXT IS NULL OR account_name = $2) \
             ORDER BY occurred_at DESC, id DESC \
             LIMIT $3"
        ))
        .bind(owner_id.as_uuid())
        .bind(account_name)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    async fn load_for_owner(
        &self,
        owner_id: OwnerId,
        account_name: Option<&str>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE owner_id = $1 AND ($2::TEXT IS NULL OR account_name = $2) \
             ORDER BY id"
        ))
        .bind(owner_id.as_uuid())
        .bind(account_name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_failure_reports_unavailable() {
        let err = PgLedgerStore::connect("not a connection string")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
