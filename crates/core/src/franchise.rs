//! Franchise and frequency calculus: retry quotas, retention windows and
//! retry-key composition.
//!
//! Behavior varies by franchise through a small tagged enumeration rather
//! than per-franchise types; each tag maps to its frequencies, quotas and
//! key shape.

use crate::error::Error;
use crate::{MS_PER_DAY, MS_PER_MONTH};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Card network a command applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Franchise {
    Visa,
    MasterCard,
}

impl Franchise {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "VISA",
            Self::MasterCard => "MASTERCARD",
        }
    }

    /// Frequencies evaluated for a retry command, in processing order.
    /// Daily runs before monthly so precondition-failure diagnostics are
    /// deterministic.
    pub fn frequencies(self) -> &'static [Frequency] {
        match self {
            Self::Visa => &[Frequency::Monthly],
            Self::MasterCard => &[Frequency::Daily, Frequency::Monthly],
        }
    }

    /// Retry quota for one of this franchise's frequencies.
    pub fn limit(self, frequency: Frequency) -> usize {
        match (self, frequency) {
            (Self::Visa, Frequency::Monthly) => 15,
            (Self::MasterCard, Frequency::Daily) => 7,
            (Self::MasterCard, Frequency::Monthly) => 35,
            // Visa has no daily frequency; an unbounded quota keeps the
            // lookup total without ever triggering a block.
            (Self::Visa, Frequency::Daily) => usize::MAX,
        }
    }

    /// Whether the non-overflow retry path records `lastRetry` on the
    /// blocked-card record. Visa does not track daily retries.
    pub fn tracks_last_retry(self) -> bool {
        matches!(self, Self::MasterCard)
    }

    /// Compose the retry-counter primary key.
    ///
    /// MasterCard: `{cardID}-{merchantID}-{frequency}`. Visa partitions
    /// additionally by the caller-supplied decline-reason conditional:
    /// `{cardID}-{merchantID}-{conditional}-{frequency}`.
    pub fn retry_key(
        self,
        card_id: &str,
        merchant_id: &str,
        conditional: &str,
        frequency: Frequency,
    ) -> String {
        match self {
            Self::MasterCard => format!("{card_id}-{merchant_id}-{}", frequency.as_str()),
            Self::Visa => {
                format!("{card_id}-{merchant_id}-{conditional}-{}", frequency.as_str())
            }
        }
    }
}

impl FromStr for Franchise {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("VISA") {
            Ok(Self::Visa)
        } else if s.eq_ignore_ascii_case("MASTERCARD") {
            Ok(Self::MasterCard)
        } else {
            Err(Error::UnknownFranchise(s.to_string()))
        }
    }
}

impl std::fmt::Display for Franchise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Franchise {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Franchise {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Retention window for a retry counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    /// Sliding-window retention in milliseconds.
    pub fn retention_ms(self) -> i64 {
        match self {
            Self::Daily => MS_PER_DAY,
            Self::Monthly => MS_PER_MONTH,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command operation on a (card, merchant) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Block,
    Retry,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Retry => "retry",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("block") {
            Ok(Self::Block)
        } else if s.eq_ignore_ascii_case("retry") {
            Ok(Self::Retry)
        } else {
            Err(Error::UnknownOperation(s.to_string()))
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn franchise_parses_case_insensitively() {
        assert_eq!("visa".parse::<Franchise>().unwrap(), Franchise::Visa);
        assert_eq!("VISA".parse::<Franchise>().unwrap(), Franchise::Visa);
        assert_eq!(
            "MasterCard".parse::<Franchise>().unwrap(),
            Franchise::MasterCard
        );
        assert!("AMEX".parse::<Franchise>().is_err());
    }

    #[test]
    fn frequencies_keep_daily_before_monthly() {
        assert_eq!(
            Franchise::MasterCard.frequencies(),
            &[Frequency::Daily, Frequency::Monthly]
        );
        assert_eq!(Franchise::Visa.frequencies(), &[Frequency::Monthly]);
    }

    #[test]
    fn limits_match_franchise_quotas() {
        assert_eq!(Franchise::MasterCard.limit(Frequency::Daily), 7);
        assert_eq!(Franchise::MasterCard.limit(Frequency::Monthly), 35);
        assert_eq!(Franchise::Visa.limit(Frequency::Monthly), 15);
    }

    #[test]
    fn mastercard_retry_key_omits_conditional() {
        let key = Franchise::MasterCard.retry_key("C1", "M1", "X", Frequency::Daily);
        assert_eq!(key, "C1-M1-daily");
    }

    #[test]
    fn visa_retry_key_partitions_by_conditional() {
        let key = Franchise::Visa.retry_key("C1", "M1", "X", Frequency::Monthly);
        assert_eq!(key, "C1-M1-X-monthly");
    }

    #[test]
    fn operation_parses_case_insensitively() {
        assert_eq!("BLOCK".parse::<Operation>().unwrap(), Operation::Block);
        assert_eq!("retry".parse::<Operation>().unwrap(), Operation::Retry);
        assert!("restore".parse::<Operation>().is_err());
    }
}
