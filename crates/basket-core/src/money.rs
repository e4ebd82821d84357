//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  THE INTEGER CENTS PROBLEM                                              │
//! │    10% of 12.99 = 1.299 → 129.9 cents  ❌ cannot be stored!             │
//! │                                                                         │
//! │  OUR SOLUTION: Exact decimals, rounded ONCE at the end                  │
//! │    12.99 - 1.299 = 11.691 → round half-up → 11.69                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use basket_core::money::Money;
//!
//! let price = Money::from_cents(1299);       // 12.99
//! let doubled = price * 2usize;               // 25.98
//! assert_eq!(doubled.to_string(), "25.98");
//!
//! // Sub-cent intermediates are kept until the final rounding
//! let total = Money::from_cents(1169) + "0.005".parse::<Money>().unwrap();
//! assert_eq!(total.to_currency().to_string(), "11.70");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::CURRENCY_SCALE;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the (single) store currency.
///
/// ## Design Decisions
/// - **Decimal**: exact base-10 arithmetic, 28 significant digits
/// - **Unrounded by default**: arithmetic keeps every digit; only
///   [`Money::to_currency`] rounds, and the pricing engine calls it once
/// - **Serde transparent**: serializes as a decimal string, e.g. `"12.99"`
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► pricing engine ──► subtotal / discount / net
///                                             │
///                                             ▼
///                               total.to_currency() ──► "41.35"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use basket_core::money::Money;
    ///
    /// let price = Money::from_cents(399);
    /// assert_eq!(price.to_string(), "3.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_SCALE))
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Number of fraction digits currently carried.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// Rounds to `dp` fraction digits, with a midpoint rounding away from zero.
    ///
    /// ## Half-Up vs Bankers Rounding
    /// ```text
    /// value     half-up (this)   bankers
    /// 2.345  →  2.35             2.34
    /// 2.355  →  2.36             2.36
    /// -2.345 → -2.35            -2.34
    /// ```
    pub fn round_half_up(&self, dp: u32) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Rounds half-up to currency precision and pins the scale to exactly two
    /// digits, so zero renders as `0.00` rather than `0`.
    pub fn to_currency(&self) -> Money {
        let mut rounded = self.round_half_up(CURRENCY_SCALE).0;
        rounded.rescale(CURRENCY_SCALE);
        Money(rounded)
    }

    /// Adds, clamping at the largest representable amount instead of
    /// overflowing.
    #[inline]
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Splits the amount into `parts` equal shares at full precision.
    ///
    /// Returns `None` when `parts` is zero.
    ///
    /// ## Example
    /// ```rust
    /// use basket_core::money::Money;
    ///
    /// let share = Money::from_cents(1197).split_evenly(3).unwrap();
    /// assert_eq!(share, Money::from_cents(399));
    /// assert!(Money::from_cents(100).split_evenly(0).is_none());
    /// ```
    pub fn split_evenly(&self, parts: usize) -> Option<Money> {
        if parts == 0 {
            return None;
        }
        self.0.checked_div(Decimal::from(parts)).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Prints the amount with the digits it carries (`12.99`, `1.299`, `0.00`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Parses a plain decimal string such as `"12.99"`.
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a decimal factor (rates such as `0.10`).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

/// Multiplication by a count of items.
impl Mul<usize> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: usize) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
