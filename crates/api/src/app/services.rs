//! Service wiring: store selection, owner bootstrap, and the core operations
//! exposed to the HTTP handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use thiserror::Error;

use nestegg_auth::{Session, SessionKeys, TokenError, verify_password};
use nestegg_core::{DomainError, Money, OwnerId};
use nestegg_ledger::{Transaction, TransactionDraft, balance};
use nestegg_store::{LedgerStore, MemLedgerStore, PgLedgerStore, StoreError};

use crate::config::Config;

/// Operation error, split so callers can distinguish "fix your input"
/// (Domain) from "try again later" (Store).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Result of recording one transaction: the stored row plus the affected
/// account's freshly derived balance.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTransaction {
    pub transaction: Transaction,
    pub new_balance: Money,
}

/// History page plus the derived balances the original UI shows alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub transactions: Vec<Transaction>,
    pub account_balances: BTreeMap<String, Money>,
    pub total_balance: Money,
}

/// Application services handed to every handler via an `Extension`.
pub struct AppServices {
    store: Arc<dyn LedgerStore>,
    owner_id: OwnerId,
    password_hash: String,
    keys: Arc<SessionKeys>,
    session_ttl: chrono::Duration,
}

/// Wire up services per config: Postgres when `USE_PERSISTENT_STORE=true`,
/// the in-memory store otherwise. Also spawns the periodic store keep-alive
/// ping on its own timer, uncoordinated with request handling.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let (store, owner_id): (Arc<dyn LedgerStore>, OwnerId) = if config.use_persistent_store {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set when USE_PERSISTENT_STORE=true")?;
        let store = PgLedgerStore::connect(url).await?;
        store.ensure_schema().await?;
        let owner_id = store.ensure_owner().await?;
        tracing::info!(owner_id = %owner_id, "using persistent ledger store");
        (Arc::new(store), owner_id)
    } else {
        let owner_id = OwnerId::new();
        tracing::info!(owner_id = %owner_id, "using in-memory ledger store");
        (Arc::new(MemLedgerStore::new()), owner_id)
    };

    spawn_keepalive(store.clone(), config.store_ping_interval);

    Ok(AppServices::new(
        store,
        owner_id,
        config.password_hash.clone(),
        Arc::new(SessionKeys::new(config.session_secret.as_bytes())),
        config.session_ttl,
    ))
}

fn spawn_keepalive(store: Arc<dyn LedgerStore>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            if let Err(e) = store.ping().await {
                tracing::warn!("store keep-alive ping failed: {e}");
            }
        }
    });
}

impl AppServices {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        owner_id: OwnerId,
        password_hash: String,
        keys: Arc<SessionKeys>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            store,
            owner_id,
            password_hash,
            keys,
            session_ttl,
        }
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn session_keys(&self) -> Arc<SessionKeys> {
        self.keys.clone()
    }

    /// Verify the shared password and mint a session on success.
    pub fn login(&self, password: &str) -> Result<Session, ServiceError> {
        if !verify_password(password, &self.password_hash) {
            return Err(DomainError::Unauthorized.into());
        }
        let session = self.keys.mint(self.owner_id, Utc::now(), self.session_ttl)?;
        Ok(session)
    }

    /// Append a validated transaction and recompute the affected account's
    /// balance from its full history.
    pub async fn record_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<RecordedTransaction, ServiceError> {
        let transaction = self.store.append(draft).await?;

        let history = self
            .store
            .load_for_owner(transaction.owner_id, Some(&transaction.account_name))
            .await?;
        let new_balance = balance::account_balance(&history);

        tracing::info!(
            account = %transaction.account_name,
            kind = transaction.kind.as_str(),
            amount = %transaction.amount,
            new_balance = %new_balance,
            "transaction recorded"
        );

        Ok(RecordedTransaction {
            transaction,
            new_balance,
        })
    }

    /// History page (newest `occurred_at` first, bounded by `limit`) plus
    /// per-account and total balances derived from the full history.
    pub async fn history(
        &self,
        owner_id: OwnerId,
        account_name: Option<&str>,
        limit: i64,
    ) -> Result<HistoryView, ServiceError> {
        let transactions = self
            .store
            .list_for_owner(owner_id, account_name, limit)
            .await?;

        let full_history = self.store.load_for_owner(owner_id, None).await?;
        let account_balances = balance::balances_by_account(&full_history);
        let total_balance = balance::total_balance(&full_history);

        Ok(HistoryView {
            transactions,
            account_balances,
            total_balance,
        })
    }

    /// Balance of one account. An account with no transactions reports zero;
    /// accounts are implicit, so this is never "not found".
    pub async fn balance_for(
        &self,
        owner_id: OwnerId,
        account_name: &str,
    ) -> Result<Money, ServiceError> {
        let history = self
            .store
            .load_for_owner(owner_id, Some(account_name))
            .await?;
        Ok(balance::account_balance(&history))
    }

    /// Per-account balances plus the total, derived from one history read so
    /// the two views always agree within a response.
    pub async fn balance_summary(
        &self,
        owner_id: OwnerId,
    ) -> Result<(BTreeMap<String, Money>, Money), ServiceError> {
        let history = self.store.load_for_owner(owner_id, None).await?;
        let by_account = balance::balances_by_account(&history);
        let total = balance::total_balance(&history);
        Ok((by_account, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestegg_auth::hash_password;
    use nestegg_ledger::TransactionKind;

    fn test_services() -> AppServices {
        AppServices::new(
            Arc::new(MemLedgerStore::new()),
            OwnerId::new(),
            hash_password("correct horse"),
            Arc::new(SessionKeys::new(b"test-secret")),
            chrono::Duration::minutes(30),
        )
    }

    fn draft(services: &AppServices, account: &str, kind: TransactionKind, amount: &str) -> TransactionDraft {
        TransactionDraft::new(
            services.owner_id(),
            account,
            kind,
            Money::parse(amount).unwrap(),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn login_accepts_the_shared_password_only() {
        let services = test_services();

        let session = services.login("correct horse").unwrap();
        let claims = services
            .session_keys()
            .verify(&session.token, Utc::now())
            .unwrap();
        assert_eq!(claims.sub, services.owner_id());

        let err = services.login("battery staple").unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Unauthorized)));
    }

    #[tokio::test]
    async fn record_then_derive_balances() {
        let services = test_services();
        let owner = services.owner_id();

        let rec = services
            .record_transaction(draft(&services, "Savings", TransactionKind::Credit, "100.00"))
            .await
            .unwrap();
        assert_eq!(rec.new_balance, Money::parse("100.00").unwrap());
        assert_eq!(
            services.balance_for(owner, "Savings").await.unwrap(),
            Money::parse("100.00").unwrap()
        );

        let rec = services
            .record_transaction(draft(&services, "Savings", TransactionKind::Debit, "30.00"))
            .await
            .unwrap();
        assert_eq!(rec.new_balance, Money::parse("70.00").unwrap());

        services
            .record_transaction(draft(&services, "Piggy", TransactionKind::Credit, "50.00"))
            .await
            .unwrap();

        let (by_account, total) = services.balance_summary(owner).await.unwrap();
        assert_eq!(total, Money::parse("120.00").unwrap());
        assert_eq!(by_account["Savings"], Money::parse("70.00").unwrap());
        assert_eq!(by_account["Piggy"], Money::parse("50.00").unwrap());
    }

    #[tokio::test]
    async fn balance_summary_views_agree() {
        let services = test_services();
        let owner = services.owner_id();

        for (account, kind, amount) in [
            ("Savings", TransactionKind::Credit, "100.00"),
            ("Savings", TransactionKind::Debit, "30.00"),
            ("Piggy", TransactionKind::Credit, "50.00"),
        ] {
            services
                .record_transaction(draft(&services, account, kind, amount))
                .await
                .unwrap();
        }

        // Both views come from a single history read, so the total must be
        // exactly the sum of the per-account entries.
        let (by_account, total) = services.balance_summary(owner).await.unwrap();
        let from_accounts: i64 = by_account.values().map(Money::as_cents).sum();
        assert_eq!(total.as_cents(), from_accounts);
    }

    #[tokio::test]
    async fn history_bounds_results_and_reports_balances() {
        let services = test_services();
        let owner = services.owner_id();

        for (account, amount) in [("Savings", "10.00"), ("Savings", "20.00"), ("Piggy", "5.00")] {
            services
                .record_transaction(draft(&services, account, TransactionKind::Credit, amount))
                .await
                .unwrap();
        }

        let view = services.history(owner, None, 1).await.unwrap();
        assert_eq!(view.transactions.len(), 1);
        assert_eq!(view.total_balance, Money::parse("35.00").unwrap());
        assert_eq!(view.account_balances.len(), 2);

        let savings_only = services.history(owner, Some("Savings"), 50).await.unwrap();
        assert_eq!(savings_only.transactions.len(), 2);
    }

    #[tokio::test]
    async fn rejected_draft_leaves_the_store_unchanged() {
        let services = test_services();
        let owner = services.owner_id();

        let err = TransactionDraft::new(
            owner,
            "Savings",
            TransactionKind::Credit,
            Money::parse("0.00").unwrap(),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidAmount(_)));

        // Nothing reached the store: the failure happened at draft
        // construction, before any write.
        let view = services.history(owner, None, 50).await.unwrap();
        assert!(view.transactions.is_empty());
        assert_eq!(view.total_balance, Money::ZERO);
    }

    #[tokio::test]
    async fn unknown_account_reports_zero_not_missing() {
        let services = test_services();
        assert_eq!(
            services
                .balance_for(services.owner_id(), "Nonexistent")
                .await
                .unwrap(),
            Money::ZERO
        );
    }
}
