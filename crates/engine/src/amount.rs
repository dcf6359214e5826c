use std::{fmt, str::FromStr};

use crate::EngineError;

/// Expense amount represented as **integer hundredths**.
///
/// The value is a currency-agnostic magnitude: the engine never attaches a
/// currency to it. Amounts stored on an expense are always strictly positive;
/// totals may be zero.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount = Amount::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 2 decimals, signs and zero):
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("1500".parse::<Amount>().unwrap().minor(), 150_000);
/// assert_eq!("99,9".parse::<Amount>().unwrap().minor(), 9_990);
/// assert!("12.345".parse::<Amount>().is_err());
/// assert!("0".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Largest amount a single expense may carry: one trillion whole units.
    pub const MAX: Amount = Amount(1_000_000_000_000 * 100);

    /// Creates a new amount from integer hundredths.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in hundredths.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount fits on a single expense: `0 < amount <= MAX`.
    #[must_use]
    pub const fn is_valid_expense(self) -> bool {
        self.0 > 0 && self.0 <= Self::MAX.0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Share of `self` over `total`, in percent. Zero when `total` is zero.
    #[must_use]
    pub fn percent_of(self, total: Amount) -> f64 {
        if total.0 == 0 {
            return 0.0;
        }
        self.0 as f64 * 100.0 / total.0 as f64
    }

    /// Formats the amount with `,` thousands separators (`1,500.00`).
    #[must_use]
    pub fn grouped(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = (abs / 100).to_string();
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (idx, ch) in units.chars().enumerate() {
            if idx > 0 && (units.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{sign}{grouped}.{:02}", abs % 100)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a user supplied decimal string into hundredths.
    ///
    /// Validation rules:
    /// - `.` or `,` as decimal separator, surrounding whitespace ignored
    /// - max 2 fractional digits (rejects `12.345`)
    /// - no sign, no exponent, no thousands separators
    /// - the result must be > 0 and at most [`Amount::MAX`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let normalized = trimmed.replace(',', ".");
        let mut parts = normalized.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let frac: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => {
                        return Err(EngineError::InvalidAmount(
                            "too many decimals".to_string(),
                        ));
                    }
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(overflow)?;

        if total <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        if total > Self::MAX.0 {
            return Err(overflow());
        }

        Ok(Amount(total))
    }
}
