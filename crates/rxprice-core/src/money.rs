//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, and the
//! `RoundingPolicy` applied to computed prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    100000 × (1 − 0.2) = 80000.00000000001  ❌ WRONG!                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + basis points                       │
//! │    100000 × (10000 − 2000) / 10000 = 80000  ✅                          │
//! │                                                                         │
//! │  Minor unit = smallest unit of the currency:                            │
//! │    USD → cent        VND → đồng (no subunit in practice)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rxprice_core::money::Money;
//! use rxprice_core::types::Percent;
//!
//! let list = Money::from_minor(100_000);
//! let discounted = list.apply_percentage_discount(Percent::from_bps(2000)); // 20% off
//! assert_eq!(discounted.minor(), 80_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{Percent, TaxRate};

/// Basis points in 100%.
pub const BPS_SCALE: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative deltas (a contract price above list
///   price yields negative savings)
/// - **Single field tuple struct**: Zero-cost abstraction over i64, and it
///   serializes as a plain JSON number
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.sale_price/base_price ──► list_price                           │
/// │                                        │                                │
/// │        contract / rule / volume tier ──┼──► final_price ──► tax_amount  │
/// │                                        │                       │        │
/// │                                        ▼                       ▼        │
/// │                               breakdown deltas           total_amount   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    ///
    /// ```rust
    /// use rxprice_core::money::Money;
    ///
    /// let price = Money::from_minor(85_000);
    /// assert_eq!(price.minor(), 85_000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount, rounding half away from zero to the
    /// minor unit.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * bps) / 10000`, rounded.
    ///
    /// ```rust
    /// use rxprice_core::money::Money;
    /// use rxprice_core::types::TaxRate;
    ///
    /// let price = Money::from_minor(1000);
    /// let tax = price.calculate_tax(TaxRate::from_bps(825)); // 8.25%
    /// // 1000 × 8.25% = 82.5 → 83
    /// assert_eq!(tax.minor(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = div_round_half_up(self.0 as i128 * rate.bps() as i128, BPS_SCALE as i128);
        Money(saturate(tax))
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use rxprice_core::money::Money;
    ///
    /// let line_total = Money::from_minor(85_000).checked_mul_quantity(12);
    /// assert_eq!(line_total, Some(Money::from_minor(1_020_000)));
    /// assert_eq!(Money::from_minor(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Applies a percentage discount and returns the discounted price.
    ///
    /// `discounted = round(self × (100% − discount))`. A discount above
    /// 100% is clamped so the result never goes below zero.
    ///
    /// ```rust
    /// use rxprice_core::money::Money;
    /// use rxprice_core::types::Percent;
    ///
    /// let list = Money::from_minor(10_000);
    /// assert_eq!(list.apply_percentage_discount(Percent::from_bps(1000)).minor(), 9_000);
    /// ```
    pub fn apply_percentage_discount(&self, discount: Percent) -> Money {
        let keep = (BPS_SCALE - discount.bps() as i64).max(0);
        let discounted = div_round_half_up(self.0 as i128 * keep as i128, BPS_SCALE as i128);
        Money(saturate(discounted))
    }

    /// Subtracts a fixed amount, never going below zero.
    ///
    /// ```rust
    /// use rxprice_core::money::Money;
    ///
    /// let list = Money::from_minor(5_000);
    /// assert_eq!(list.minus_floored(Money::from_minor(8_000)), Money::zero());
    /// ```
    #[inline]
    pub fn minus_floored(&self, amount: Money) -> Money {
        Money((self.0 - amount.0).max(0))
    }

    /// Expresses `self` as a share of `whole`, in basis points.
    ///
    /// Returns 0 when `whole` is zero. The result is signed: a negative
    /// `self` (e.g. negative savings) gives a negative share.
    ///
    /// ```rust
    /// use rxprice_core::money::Money;
    ///
    /// let savings = Money::from_minor(15_000);
    /// assert_eq!(savings.share_of_bps(Money::from_minor(100_000)), 1500);
    /// assert_eq!(savings.share_of_bps(Money::zero()), 0);
    /// ```
    pub fn share_of_bps(&self, whole: Money) -> i64 {
        if whole.is_zero() {
            return 0;
        }
        saturate(div_round_half_up(self.0 as i128 * BPS_SCALE as i128, whole.0 as i128))
    }
}

/// Narrows an i128 intermediate back to i64, clamping at the bounds.
pub(crate) fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Integer division rounding half away from zero.
///
/// Works for any sign of numerator and denominator; `den` must be non-zero.
pub(crate) fn div_round_half_up(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (num + den / 2) / den
    } else {
        -((-num + den / 2) / den)
    }
}

// =============================================================================
// Rounding Policy
// =============================================================================

/// Rounding applied to computed (discounted) prices.
///
/// `increment` is expressed in minor units: `1` rounds to the minor unit
/// (cents for USD), `1000` rounds a VND price to the nearest thousand đồng.
/// Rounding is half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundingPolicy {
    increment: i64,
}

impl RoundingPolicy {
    /// Creates a policy rounding to multiples of `increment` minor units.
    /// Increments below 1 behave like exact minor-unit rounding.
    pub fn new(increment: i64) -> Self {
        RoundingPolicy {
            increment: increment.max(1),
        }
    }

    /// Rounds to the minor unit (no additional rounding).
    #[inline]
    pub const fn exact() -> Self {
        RoundingPolicy { increment: 1 }
    }

    /// Returns the rounding increment in minor units.
    #[inline]
    pub const fn increment(&self) -> i64 {
        self.increment
    }

    /// Rounds an amount to the nearest multiple of the increment.
    ///
    /// ```rust
    /// use rxprice_core::money::{Money, RoundingPolicy};
    ///
    /// let policy = RoundingPolicy::new(1000);
    /// assert_eq!(policy.apply(Money::from_minor(84_499)).minor(), 84_000);
    /// assert_eq!(policy.apply(Money::from_minor(84_500)).minor(), 85_000);
    /// ```
    pub fn apply(&self, amount: Money) -> Money {
        if self.increment == 1 {
            return amount;
        }
        let steps = div_round_half_up(amount.0 as i128, self.increment as i128);
        Money(saturate(steps * self.increment as i128))
    }
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        RoundingPolicy::exact()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain minor-unit rendering, for logs only. Currency formatting belongs
/// to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
