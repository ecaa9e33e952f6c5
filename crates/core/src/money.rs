//! Fixed-point money.
//!
//! Amounts are base-10 fixed point with exactly two fractional digits,
//! stored as `i64` minor units (cents). Binary floating point never touches
//! a financial sum.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// A signed monetary value in minor units (cents).
///
/// Transaction amounts are strictly positive (enforced at the ledger
/// boundary); derived balances may be negative, so the type itself is signed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn as_cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Parse a decimal money string.
    ///
    /// Thousands-separator commas are stripped before conversion, so
    /// `"1,234.50"` and `"1234.50"` are the same value. Anything that is not
    /// a plain decimal numeral (optional leading sign, at most two fractional
    /// digits) is rejected.
    pub fn parse(input: &str) -> Result<Money, DomainError> {
        let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(DomainError::invalid_amount(format!(
                "not a decimal numeral: {input:?}"
            )));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(DomainError::invalid_amount(format!(
                "not a decimal numeral: {input:?}"
            )));
        }
        if frac.len() > 2 {
            return Err(DomainError::invalid_amount(format!(
                "at most two decimal places allowed: {input:?}"
            )));
        }

        let whole_cents = if whole.is_empty() {
            0i64
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| DomainError::invalid_amount(format!("amount out of range: {input:?}")))?
        };

        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        let cents = whole_cents
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(|| DomainError::invalid_amount(format!("amount out of range: {input:?}")))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

// Money crosses the wire as a string, never as a binary float.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Money::parse(&raw).map_err(serde::de::Error::custom)
    }
}
