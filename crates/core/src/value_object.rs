//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, construct a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Monetary amount in the smallest currency unit (e.g. cents).
///
/// Signed so that validation can reject negative input explicitly instead of
/// relying on a parse failure.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Total of `amounts`, or `None` if it does not fit.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_displays_two_decimals() {
        assert_eq!(Money::from_cents(1_000_050).to_string(), "10000.50");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-250).to_string(), "-2.50");
    }

    #[test]
    fn money_sums_by_value_and_detects_overflow() {
        let total = Money::checked_sum([Money::from_cents(100), Money::from_cents(250)]);
        assert_eq!(total, Some(Money::from_cents(350)));
        assert_eq!(Money::checked_sum([]), Some(Money::ZERO));
        let half = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(Money::checked_sum([half, half]), None);
        assert_eq!(Money::ZERO.checked_add(Money::from_cents(i64::MAX)), Some(Money::from_cents(i64::MAX)));
        assert_eq!(Money::from_cents(1).checked_add(Money::from_cents(i64::MAX)), None);
    }
}
