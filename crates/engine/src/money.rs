use std::{
    fmt,
    ops::{AddAssign, Neg},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed amount in minor units (1/100 of the currency unit).
///
/// Budgets, balances and expense amounts all use it. Remaining balances and
/// planned budgets may be negative after an overrun or a transfer.
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!(MoneyCents::new(1234).to_string(), "12.34");
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap(), MoneyCents::new(1050));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest magnitude accepted for an amount or a stored balance
    /// (10^13 units).
    pub const MAX_ABS: MoneyCents = MoneyCents(1_000_000_000_000_000);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// `from_units(1500)` is `1500.00`.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the magnitude stays within [`MoneyCents::MAX_ABS`].
    #[must_use]
    pub const fn in_range(self) -> bool {
        self.0 >= -Self::MAX_ABS.0 && self.0 <= Self::MAX_ABS.0
    }

    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", abs / 100, abs % 100)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

fn digits(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Reads `[+-]units[.cc]`; `,` is accepted in place of `.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidInput(format!("invalid amount: {s:?}"));

        let text = s.trim();
        let (negative, text) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (whole, fraction) = match text.find(['.', ',']) {
            Some(at) => (&text[..at], &text[at + 1..]),
            None => (text, ""),
        };
        let whole = digits(whole).ok_or_else(invalid)?;
        let fraction = match fraction.len() {
            0 => 0,
            1 => digits(fraction).ok_or_else(invalid)? * 10,
            2 => digits(fraction).ok_or_else(invalid)?,
            _ => {
                return Err(EngineError::InvalidInput(format!(
                    "at most two decimals allowed: {s:?}"
                )));
            }
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .ok_or_else(|| EngineError::InvalidInput(format!("amount too large: {s:?}")))?;
        Ok(MoneyCents(if negative { -cents } else { cents }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(150_000).to_string(), "1500.00");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn checked_sub_detects_overflow() {
        assert!(MoneyCents::new(i64::MIN).checked_sub(MoneyCents::new(1)).is_none());
        assert_eq!(
            MoneyCents::new(500).checked_sub(MoneyCents::new(800)),
            Some(MoneyCents::new(-300))
        );
    }

    #[test]
    fn range_is_symmetric() {
        assert!(MoneyCents::MAX_ABS.in_range());
        assert!((-MoneyCents::MAX_ABS).in_range());
        assert!(!MoneyCents::new(MoneyCents::MAX_ABS.cents() + 1).in_range());
        assert!(!MoneyCents::new(i64::MAX).in_range());
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10.".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_garbage_and_extra_decimals() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("0.001".parse::<MoneyCents>().is_err());
        assert!("".parse::<MoneyCents>().is_err());
        assert!("-".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("1e5".parse::<MoneyCents>().is_err());
    }
}
