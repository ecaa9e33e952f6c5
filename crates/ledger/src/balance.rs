//! The balance engine: pure derivations over transaction history.
//!
//! No balance is ever stored or cached. Every read recomputes from the full
//! history, which is O(n) in transaction count. That trades read cost for
//! zero write-time bookkeeping and zero drift risk; at single-owner volume
//! the trade is free.

use std::collections::BTreeMap;

use nestegg_core::Money;

use crate::transaction::Transaction;

/// Signed sum over whatever subset of the ledger the caller hands in.
///
/// Saturates instead of wrapping; an i64 of cents overflows only far beyond
/// any plausible personal ledger.
fn signed_sum<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Money {
    let total: i128 = txns.into_iter().map(|t| t.signed_cents() as i128).sum();
    Money::from_cents(i64::try_from(total).unwrap_or_else(|_| {
        if total > 0 { i64::MAX } else { i64::MIN }
    }))
}

/// Balance of a single account: Σ credits − Σ debits over the transactions
/// passed in. Callers pre-filter by owner and account name.
pub fn account_balance<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Money {
    signed_sum(txns)
}

/// Total balance across all of an owner's accounts.
pub fn total_balance<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Money {
    signed_sum(txns)
}

/// Per-account balances: one entry per distinct account name that has at
/// least one transaction.
pub fn balances_by_account<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<String, Money> {
    let mut totals: BTreeMap<String, i128> = BTreeMap::new();
    for t in txns {
        *totals.entry(t.account_name.clone()).or_insert(0) += t.signed_cents() as i128;
    }
    totals
        .into_iter()
        .map(|(name, cents)| {
            let cents = i64::try_from(cents).unwrap_or_else(|_| {
                if cents > 0 { i64::MAX } else { i64::MIN }
            });
            (name, Money::from_cents(cents))
        })
        .collect()
}
