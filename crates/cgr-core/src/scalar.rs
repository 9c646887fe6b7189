//! Overflow-safe volume arithmetic
//!
//! Transmission volumes are products of a rate and a duration, and over
//! mission timescales those products do not fit comfortably in 64 bits
//! once they are summed across contacts. A [`Scalar`] keeps a magnitude as
//! a `(gigs, units)` pair where the value is `gigs * ONE_GIG + units` and
//! `0 <= units < ONE_GIG`.
//!
//! A scalar whose `gigs` went negative is *invalid*: it is the result of
//! subtracting more than was there. Callers detect this with
//! [`Scalar::is_valid`] and clamp to zero, which the routing engine reads
//! as "no remaining congestion".

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Size of the `units` part of a [`Scalar`]
pub const ONE_GIG: i64 = 1 << 30;

/// Arbitrary-precision non-negative magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scalar {
    gigs: i64,
    units: i64,
}

impl Scalar {
    /// The zero scalar
    pub const ZERO: Scalar = Scalar { gigs: 0, units: 0 };

    /// Load a scalar from a plain value
    pub fn new(value: i64) -> Self {
        Self::from_total(i128::from(value))
    }

    /// Build a scalar from its raw parts, normalizing `units`
    pub fn from_parts(gigs: i64, units: i64) -> Self {
        Self::from_total(i128::from(gigs) * i128::from(ONE_GIG) + i128::from(units))
    }

    fn total(&self) -> i128 {
        i128::from(self.gigs) * i128::from(ONE_GIG) + i128::from(self.units)
    }

    fn from_total(total: i128) -> Self {
        let one_gig = i128::from(ONE_GIG);
        let gigs = total.div_euclid(one_gig);
        let units = total.rem_euclid(one_gig);
        Self {
            gigs: gigs.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            units: units as i64,
        }
    }

    /// Whole `ONE_GIG` multiples
    pub fn gigs(&self) -> i64 {
        self.gigs
    }

    /// Remainder below `ONE_GIG`
    pub fn units(&self) -> i64 {
        self.units
    }

    /// Whether the scalar is non-negative
    pub fn is_valid(&self) -> bool {
        self.gigs >= 0
    }

    /// Whether the scalar is exactly zero
    pub fn is_zero(&self) -> bool {
        self.gigs == 0 && self.units == 0
    }

    /// Add a plain value
    pub fn increase(&mut self, value: i64) {
        *self = Self::from_total(self.total() + i128::from(value));
    }

    /// Subtract a plain value (may leave the scalar invalid)
    pub fn reduce(&mut self, value: i64) {
        *self = Self::from_total(self.total() - i128::from(value));
    }

    /// Add another scalar
    pub fn add(&mut self, other: &Scalar) {
        *self = Self::from_total(self.total() + other.total());
    }

    /// Subtract another scalar (may leave the scalar invalid)
    pub fn subtract(&mut self, other: &Scalar) {
        *self = Self::from_total(self.total() - other.total());
    }

    /// Subtract another scalar, flooring the result at zero
    pub fn saturating_subtract(&mut self, other: &Scalar) {
        self.subtract(other);
        self.clamp_to_zero();
    }

    /// Multiply by the magnitude of `factor`
    pub fn multiply(&mut self, factor: i64) {
        *self = Self::from_total(self.total() * i128::from(factor.unsigned_abs()));
    }

    /// Divide by the magnitude of `divisor`, truncating
    ///
    /// Division by zero leaves the scalar unchanged.
    pub fn divide(&mut self, divisor: i64) {
        if divisor == 0 {
            return;
        }
        *self = Self::from_total(self.total() / i128::from(divisor.unsigned_abs()));
    }

    /// Reset an invalid scalar to zero
    pub fn clamp_to_zero(&mut self) {
        if !self.is_valid() {
            *self = Self::ZERO;
        }
    }

    /// Value as `i64`, saturating at the bounds
    pub fn as_i64(&self) -> i64 {
        self.total().clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// Value as `f64` (lossy for very large values)
    pub fn as_f64(&self) -> f64 {
        self.gigs as f64 * ONE_GIG as f64 + self.units as f64
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::from_total(i128::from(value))
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_normalizes_units() {
        let s = Scalar::new(ONE_GIG * 3 + 17);
        assert_eq!(s.gigs(), 3);
        assert_eq!(s.units(), 17);
        assert!(s.is_valid());
    }

    #[test]
    fn test_underflow_is_invalid_and_clamps() {
        let mut s = Scalar::new(10);
        s.subtract(&Scalar::new(11));
        assert!(!s.is_valid());
        s.clamp_to_zero();
        assert!(s.is_zero());
    }

    #[test]
    fn test_saturating_subtract_never_negative() {
        let mut s = Scalar::new(5);
        for _ in 0..4 {
            s.saturating_subtract(&Scalar::new(3));
            assert!(s.is_valid());
        }
        assert!(s.is_zero());
    }

    #[test]
    fn test_multiply_past_i64_range() {
        // Rate times duration times a large count, summed, must not wrap
        let mut s = Scalar::new(i64::MAX);
        s.multiply(4);
        assert!(s.is_valid());
        assert_eq!(s.as_i64(), i64::MAX);
        s.divide(4);
        assert_eq!(s.as_i64(), i64::MAX);
    }

    #[test]
    fn test_divide_truncates() {
        let mut s = Scalar::new(1001);
        s.divide(1000);
        assert_eq!(s.as_i64(), 1);
    }

    #[test]
    fn test_divide_by_zero_is_noop() {
        let mut s = Scalar::new(99);
        s.divide(0);
        assert_eq!(s.as_i64(), 99);
    }

    #[test]
    fn test_add_carries_into_gigs() {
        let mut s = Scalar::new(ONE_GIG - 1);
        s.add(&Scalar::new(2));
        assert_eq!(s.gigs(), 1);
        assert_eq!(s.units(), 1);
    }
}
