//! `nestegg-ledger` — the transaction ledger and its derived balances.
//!
//! Two pieces compose the core: the immutable [`Transaction`] model (with
//! validated [`TransactionDraft`] inputs) and the pure [`balance`] engine
//! that derives per-account and total balances from the full history.

pub mod balance;
pub mod transaction;

pub use transaction::{Transaction, TransactionDraft, TransactionId, TransactionKind};
