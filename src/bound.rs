//! Bounds for interval endpoints.
//!
//! A [`Bound`] is either a finite value or one of the two infinities. Inside
//! an [`Interval`](crate::interval::Interval) of a given [`IntWidth`], `-∞`
//! and `+∞` stand for "unbounded in that direction", which within the width
//! means the smallest or largest representable value.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;

use crate::types::IntWidth;

/// Bound for interval endpoints: finite values or infinities.
///
/// # Ordering
///
/// The total order is: `-∞ < finite values < +∞`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Negative infinity (`-∞`).
    NegInf,
    /// Finite integer value.
    Finite(i64),
    /// Positive infinity (`+∞`).
    PosInf,
}

impl Bound {
    /// Extract finite value, if any.
    pub fn as_finite(self) -> Option<i64> {
        match self {
            Bound::Finite(n) => Some(n),
            _ => None,
        }
    }

    /// Check if this bound is finite.
    pub fn is_finite(self) -> bool {
        matches!(self, Bound::Finite(_))
    }

    /// Check if this bound is one of the infinities.
    pub fn is_infinite(self) -> bool {
        !self.is_finite()
    }

    /// The concrete value this bound denotes when used as a *lower* bound
    /// of a `width`-bit value.
    pub fn lower_in(self, width: IntWidth) -> i64 {
        match self {
            Bound::NegInf => width.min_value(),
            Bound::Finite(n) => n.max(width.min_value()),
            Bound::PosInf => width.max_value(),
        }
    }

    /// The concrete value this bound denotes when used as an *upper* bound
    /// of a `width`-bit value.
    pub fn upper_in(self, width: IntWidth) -> i64 {
        match self {
            Bound::NegInf => width.min_value(),
            Bound::Finite(n) => n.min(width.max_value()),
            Bound::PosInf => width.max_value(),
        }
    }

    /// Shadow (unbounded precision) value of a lower bound.
    pub fn lower_big(self, width: IntWidth) -> BigInt {
        BigInt::from(self.lower_in(width))
    }

    /// Shadow (unbounded precision) value of an upper bound.
    pub fn upper_big(self, width: IntWidth) -> BigInt {
        BigInt::from(self.upper_in(width))
    }

    /// Negation of bound.
    pub fn neg(self) -> Bound {
        match self {
            Bound::NegInf => Bound::PosInf,
            Bound::Finite(n) => n.checked_neg().map_or(Bound::PosInf, Bound::Finite),
            Bound::PosInf => Bound::NegInf,
        }
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Bound::NegInf, Bound::NegInf) => Ordering::Equal,
            (Bound::NegInf, _) => Ordering::Less,
            (_, Bound::NegInf) => Ordering::Greater,
            (Bound::PosInf, Bound::PosInf) => Ordering::Equal,
            (Bound::PosInf, _) => Ordering::Greater,
            (_, Bound::PosInf) => Ordering::Less,
            (Bound::Finite(a), Bound::Finite(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::NegInf => write!(f, "-∞"),
            Bound::Finite(n) => write!(f, "{}", n),
            Bound::PosInf => write!(f, "+∞"),
        }
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Bound::Finite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_ordering() {
        use Bound::*;

        assert!(NegInf < Finite(i64::MIN));
        assert!(Finite(i64::MAX) < PosInf);
        assert!(Finite(-100) < Finite(100));
        assert_eq!(Finite(3).max(NegInf), Finite(3));
        assert_eq!(Finite(3).min(PosInf), Finite(3));
    }

    #[test]
    fn test_bound_in_width() {
        use Bound::*;

        let w = IntWidth::I8;
        assert_eq!(NegInf.lower_in(w), -128);
        assert_eq!(PosInf.upper_in(w), 127);
        assert_eq!(Finite(5).lower_in(w), 5);
        assert_eq!(Finite(500).upper_in(w), 127);
        assert_eq!(PosInf.upper_big(IntWidth::I64), BigInt::from(i64::MAX));
    }

    #[test]
    fn test_bound_neg() {
        use Bound::*;

        assert_eq!(Finite(5).neg(), Finite(-5));
        assert_eq!(NegInf.neg(), PosInf);
        assert_eq!(PosInf.neg(), NegInf);
        assert_eq!(Finite(i64::MIN).neg(), PosInf);
    }
}
