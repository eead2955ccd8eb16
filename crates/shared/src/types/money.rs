//! Currency precision and rounding rules.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal` expressed in major units with
//! two decimal places of precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places of the minor currency unit (cents).
pub const MINOR_UNIT_DP: u32 = 2;

/// Tolerance when reconciling split parameters against a total (one cent,
/// or one hundredth of a percentage point).
pub const SPLIT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest amount a single expense may carry (10^15 major units).
///
/// Keeps every split product and sum well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// A balance whose magnitude is below this is considered settled.
pub const SETTLED_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds an amount to the minor unit using round-half-up.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tally_shared::types::round_currency;
///
/// assert_eq!(round_currency(dec!(3.335)), dec!(3.34));
/// assert_eq!(round_currency(dec!(3.3333)), dec!(3.33));
/// ```
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if the balance is within the settled epsilon of zero.
#[must_use]
pub fn is_settled(balance: Decimal) -> bool {
    balance.abs() < SETTLED_EPSILON
}

/// ISO 4217 currency codes supported for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Euro
    #[default]
    Eur,
    /// US Dollar
    Usd,
    /// Pound Sterling
    Gbp,
    /// Swiss Franc
    Chf,
}

impl Currency {
    /// Display symbol used by the UI.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eur => "€",
            Self::Usd => "$",
            Self::Gbp => "£",
            Self::Chf => "CHF",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eur => write!(f, "EUR"),
            Self::Usd => write!(f, "USD"),
            Self::Gbp => write!(f, "GBP"),
            Self::Chf => write!(f, "CHF"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            "CHF" => Ok(Self::Chf),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
