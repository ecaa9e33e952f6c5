use thiserror::Error;

/// Ledger store operation error.
///
/// These are **infrastructure errors** (store unreachable, write failed) as
/// opposed to domain errors. They are surfaced to the caller as a failed
/// operation that may be retried whole; a failed append never leaves a
/// partial transaction visible.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Db(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}
