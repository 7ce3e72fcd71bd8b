//! Interval abstract domain over fixed-width integers.
//!
//! An [`Interval`] is either empty ([`Interval::Bottom`]), unconstrained
//! ([`Interval::Top`]) or a range `[lo, hi]` whose endpoints are [`Bound`]s.
//! Every operation takes the [`IntWidth`] of the values it talks about, so
//! `-∞` and `+∞` are read as the smallest and largest values of that width.
//!
//! Arithmetic is computed exactly in a [`BigInt`] shadow and then fitted back
//! into the width according to the instruction's [`Overflow`] behaviour:
//!
//! - [`Overflow::NoWrap`]: overflow is a fault. A bound that leaves the
//!   representable range escapes to the matching infinity and the result is
//!   flagged as overflowing. A range that lies entirely outside becomes `Top`.
//! - [`Overflow::Wrap`]: two's-complement wraparound. Both bounds are reduced
//!   modulo `2^width` unless the exact range spans the whole width or the
//!   reduced bounds straddle the wrap point, in which case the result is `Top`.
//!
//! Potential runtime faults (overflow, division by zero) are returned as data
//! in an [`Outcome`], never as errors.

use std::fmt;

use num_bigint::BigInt;

use crate::bound::Bound;
use crate::config::DivisionPolicy;
use crate::domain::AbstractDomain;
use crate::ir::{Overflow, Predicate};
use crate::types::IntWidth;

/// Interval of integer values.
///
/// # Lattice Structure
///
/// - **Order** (`⊑`): `[l₁, h₁] ⊑ [l₂, h₂]` iff `l₂ ≤ l₁ ∧ h₁ ≤ h₂`
/// - **Join** (`⊔`): `[min(l₁, l₂), max(h₁, h₂)]` (convex hull)
/// - **Meet** (`⊓`): `[max(l₁, l₂), min(h₁, h₂)]` (intersection)
/// - **Bottom** (`⊥`): no value
/// - **Top** (`⊤`): `[-∞, +∞]`
///
/// # Widening Strategy
///
/// When the new bound exceeds the old, jump to infinity:
/// - If `b.lo < a.lo`, set `lo = -∞`
/// - If `b.hi > a.hi`, set `hi = +∞`
///
/// # Narrowing Strategy
///
/// Only infinite bounds are refined: `lo = if a.lo = -∞ { b.lo } else { a.lo }`,
/// and symmetrically for `hi`.
///
/// # Example
///
/// ```rust
/// use vsa_rs::bound::Bound;
/// use vsa_rs::domain::AbstractDomain;
/// use vsa_rs::interval::Interval;
///
/// let a = Interval::from_bounds(0, 10);
/// let b = Interval::from_bounds(5, 15);
///
/// assert_eq!(a.join(&b), Interval::from_bounds(0, 15));
/// assert_eq!(a.meet(&b), Interval::from_bounds(5, 10));
/// assert_eq!(a.widen(&b), Interval::Bounded(Bound::Finite(0), Bound::PosInf));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    /// The empty set of values.
    Bottom,
    /// Every value of the width.
    Top,
    /// Values between two bounds, both inclusive.
    ///
    /// Constructed through [`Interval::new`], which guarantees `lo ≤ hi`,
    /// `lo ≠ +∞`, `hi ≠ -∞` and `(lo, hi) ≠ (-∞, +∞)`.
    Bounded(Bound, Bound),
}

impl Interval {
    /// Create an interval `[lo, hi]`.
    ///
    /// Returns bottom if `lo > hi` and top for `[-∞, +∞]`.
    pub fn new(lo: Bound, hi: Bound) -> Self {
        match (lo, hi) {
            (Bound::NegInf, Bound::PosInf) => Interval::Top,
            (Bound::PosInf, _) | (_, Bound::NegInf) => Interval::Bottom,
            _ if lo > hi => Interval::Bottom,
            _ => Interval::Bounded(lo, hi),
        }
    }

    /// Create an interval from finite bounds `[lo, hi]`.
    pub fn from_bounds(lo: i64, hi: i64) -> Self {
        Self::new(Bound::Finite(lo), Bound::Finite(hi))
    }

    /// Create a singleton interval `[c, c]`.
    pub fn constant(c: i64) -> Self {
        Self::from_bounds(c, c)
    }

    /// Create `[lo, +∞]`.
    pub fn at_least(lo: i64) -> Self {
        Self::new(Bound::Finite(lo), Bound::PosInf)
    }

    /// Create `[-∞, hi]`.
    pub fn at_most(hi: i64) -> Self {
        Self::new(Bound::NegInf, Bound::Finite(hi))
    }

    /// Interval of the `width`-bit values in `[lo, hi]`.
    ///
    /// Collapses to `Top` when the range covers the whole width.
    pub fn from_range(lo: i64, hi: i64, width: IntWidth) -> Self {
        if lo <= width.min_value() && hi >= width.max_value() {
            Interval::Top
        } else {
            Self::from_bounds(lo, hi)
        }
    }

    /// The `(lo, hi)` bounds, or `None` for bottom.
    pub fn bounds(&self) -> Option<(Bound, Bound)> {
        match *self {
            Interval::Bottom => None,
            Interval::Top => Some((Bound::NegInf, Bound::PosInf)),
            Interval::Bounded(lo, hi) => Some((lo, hi)),
        }
    }

    /// The concrete `(min, max)` values this interval denotes for `width`-bit
    /// integers, or `None` if it denotes no value.
    pub fn range(&self, width: IntWidth) -> Option<(i64, i64)> {
        let (lo, hi) = self.bounds()?;
        let (lo, hi) = (lo.lower_in(width), hi.upper_in(width));
        (lo <= hi).then_some((lo, hi))
    }

    /// Canonical form of the interval for `width`-bit values.
    ///
    /// Infinite and out-of-width bounds are clamped to the width, a range
    /// covering every value becomes `Top` and an empty one `Bottom`, so
    /// intervals denoting the same values compare equal.
    pub fn normalize(&self, width: IntWidth) -> Interval {
        match self.range(width) {
            None => Interval::Bottom,
            Some((lo, hi)) => Interval::from_range(lo, hi, width),
        }
    }

    /// Inclusion of the `width`-bit values denoted by two intervals.
    pub fn leq_in(&self, other: &Interval, width: IntWidth) -> bool {
        self.normalize(width).leq(&other.normalize(width))
    }

    /// The single value of a singleton interval.
    pub fn as_constant(&self) -> Option<i64> {
        match *self {
            Interval::Bounded(Bound::Finite(lo), Bound::Finite(hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }

    /// Check whether `value` lies in the interval.
    pub fn contains(&self, value: i64) -> bool {
        match self.bounds() {
            None => false,
            Some((lo, hi)) => lo <= Bound::Finite(value) && Bound::Finite(value) <= hi,
        }
    }

    /// Check whether every `width`-bit value of the interval is non-negative.
    pub fn is_nonnegative(&self, width: IntWidth) -> bool {
        self.range(width).is_some_and(|(lo, _)| lo >= 0)
    }

    fn operands(&self, rhs: &Interval, width: IntWidth) -> Option<((i64, i64), (i64, i64))> {
        Some((self.range(width)?, rhs.range(width)?))
    }

    // ---------------------------------------------------------------------
    // Arithmetic
    // ---------------------------------------------------------------------

    /// Addition.
    pub fn add(&self, rhs: &Interval, width: IntWidth, overflow: Overflow) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        fit(big(a) + big(c), big(b) + big(d), width, overflow)
    }

    /// Subtraction.
    pub fn sub(&self, rhs: &Interval, width: IntWidth, overflow: Overflow) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        fit(big(a) - big(d), big(b) - big(c), width, overflow)
    }

    /// Multiplication.
    pub fn mul(&self, rhs: &Interval, width: IntWidth, overflow: Overflow) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        let corners = [a, b].into_iter().flat_map(|x| [c, d].into_iter().map(move |y| big(x) * big(y)));
        match hull(corners) {
            Some((lo, hi)) => fit(lo, hi, width, overflow),
            None => Outcome::exact(Interval::Bottom),
        }
    }

    /// Signed division, truncating toward zero.
    ///
    /// A divisor containing zero is split into its negative and positive
    /// parts (or yields `Top` under [`DivisionPolicy::Top`]); the outcome is
    /// flagged with `div_by_zero`. A divisor of exactly `{0}` yields bottom.
    /// `MIN / -1` counts as overflow.
    pub fn sdiv(&self, rhs: &Interval, width: IntWidth, overflow: Overflow, policy: DivisionPolicy) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        if let Some(outcome) = zero_divisor(c, d, policy) {
            return outcome;
        }
        let quotients = nonzero_parts(c, d)
            .flat_map(|(lo, hi)| [(a, lo), (a, hi), (b, lo), (b, hi)])
            .map(|(x, y)| big(x) / big(y));
        let Some((lo, hi)) = hull(quotients) else {
            return Outcome::exact(Interval::Bottom);
        };
        let mut outcome = fit(lo, hi, width, overflow);
        outcome.div_by_zero = c <= 0 && d >= 0;
        outcome
    }

    /// Unsigned division.
    ///
    /// Exact when both operands are known non-negative. A possibly negative
    /// dividend is a large unsigned value, bounded by `umax / divisor`; a
    /// possibly negative divisor gives a conservative result.
    pub fn udiv(&self, rhs: &Interval, width: IntWidth, policy: DivisionPolicy) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        if let Some(outcome) = zero_divisor(c, d, policy) {
            return outcome;
        }
        let value = if c >= 0 {
            let c = c.max(1);
            if a >= 0 {
                Interval::from_range(a / d, b / c, width)
            } else if c >= 2 {
                Interval::from_range(0, (width.umax() / c as u64) as i64, width)
            } else {
                Interval::Top
            }
        } else if d < 0 {
            // Every divisor is at least 2^(w-1) when read as unsigned.
            if a >= 0 {
                Interval::constant(0)
            } else {
                Interval::from_range(0, 1, width)
            }
        } else {
            Interval::Top
        };
        Outcome {
            value,
            overflow: false,
            div_by_zero: c <= 0 && d >= 0,
        }
    }

    /// Signed remainder. The result has the sign of the dividend and a
    /// magnitude below the largest divisor magnitude.
    pub fn srem(&self, rhs: &Interval, width: IntWidth, policy: DivisionPolicy) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        if let Some(outcome) = zero_divisor(c, d, policy) {
            return outcome;
        }
        let value = if a == b && c == d {
            Interval::constant((a as i128 % c as i128) as i64)
        } else {
            let m = (c as i128).abs().max((d as i128).abs()) - 1;
            let lo = if a >= 0 { 0 } else { (a as i128).max(-m) };
            let hi = if b <= 0 { 0 } else { (b as i128).min(m) };
            Interval::from_range(lo as i64, hi as i64, width)
        };
        Outcome {
            value,
            overflow: false,
            div_by_zero: c <= 0 && d >= 0,
        }
    }

    /// Unsigned remainder.
    pub fn urem(&self, rhs: &Interval, width: IntWidth, policy: DivisionPolicy) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        if let Some(outcome) = zero_divisor(c, d, policy) {
            return outcome;
        }
        let value = if c >= 0 {
            let c = c.max(1);
            if a >= 0 && a == b && c == d {
                Interval::constant(a % c)
            } else if a >= 0 && b < c {
                Interval::from_range(a, b, width)
            } else if a >= 0 {
                Interval::from_range(0, b.min(d - 1), width)
            } else {
                Interval::from_range(0, d - 1, width)
            }
        } else if a >= 0 {
            // `x urem y` never exceeds `x`.
            Interval::from_range(0, b, width)
        } else {
            Interval::Top
        };
        Outcome {
            value,
            overflow: false,
            div_by_zero: c <= 0 && d >= 0,
        }
    }

    // ---------------------------------------------------------------------
    // Shifts
    // ---------------------------------------------------------------------

    /// Left shift, treated as multiplication by `2^amount`.
    ///
    /// A shift amount that may fall outside `[0, width)` yields `Top`.
    pub fn shl(&self, rhs: &Interval, width: IntWidth, overflow: Overflow) -> Outcome {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Outcome::exact(Interval::Bottom);
        };
        if !valid_shift(c, d, width) {
            return Outcome::exact(Interval::Top);
        }
        let (f, g) = (BigInt::from(1) << c as usize, BigInt::from(1) << d as usize);
        let corners = [big(a) * &f, big(a) * &g, big(b) * &f, big(b) * &g];
        match hull(corners) {
            Some((lo, hi)) => fit(lo, hi, width, overflow),
            None => Outcome::exact(Interval::Bottom),
        }
    }

    /// Arithmetic (sign-propagating) right shift.
    pub fn ashr(&self, rhs: &Interval, width: IntWidth) -> Interval {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Interval::Bottom;
        };
        if !valid_shift(c, d, width) {
            return Interval::Top;
        }
        let (c, d) = (c as u32, d as u32);
        Interval::from_range((a >> c).min(a >> d), (b >> c).max(b >> d), width)
    }

    /// Logical (zero-filling) right shift.
    pub fn lshr(&self, rhs: &Interval, width: IntWidth) -> Interval {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Interval::Bottom;
        };
        if !valid_shift(c, d, width) {
            return Interval::Top;
        }
        let mut parts = Vec::with_capacity(2);
        if b >= 0 {
            parts.push(((a.max(0) as i128) >> d, (b as i128) >> c));
        }
        if a < 0 {
            if c == 0 {
                return Interval::Top;
            }
            let modulus = width.modulus();
            parts.push(((a as i128 + modulus) >> d, (b.min(-1) as i128 + modulus) >> c));
        }
        match hull(parts.into_iter().flat_map(|(lo, hi)| [lo, hi])) {
            Some((lo, hi)) => Interval::from_range(lo as i64, hi as i64, width),
            None => Interval::Bottom,
        }
    }

    // ---------------------------------------------------------------------
    // Bitwise operations
    // ---------------------------------------------------------------------

    /// Bitwise and.
    pub fn and(&self, rhs: &Interval, width: IntWidth) -> Interval {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Interval::Bottom;
        };
        if a == b && c == d {
            return Interval::constant(a & c);
        }
        if a >= 0 && c >= 0 {
            Interval::from_range(0, b.min(d), width)
        } else if a >= 0 {
            Interval::from_range(0, b, width)
        } else if c >= 0 {
            Interval::from_range(0, d, width)
        } else if b < 0 && d < 0 {
            // Clearing bits of a negative value keeps it negative and below it.
            Interval::from_range(width.min_value(), b.min(d), width)
        } else {
            Interval::Top
        }
    }

    /// Bitwise or.
    pub fn or(&self, rhs: &Interval, width: IntWidth) -> Interval {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Interval::Bottom;
        };
        if a == b && c == d {
            return Interval::constant(a | c);
        }
        if a >= 0 && c >= 0 {
            Interval::from_range(a.max(c), low_mask(b.max(d)), width)
        } else if b < 0 && d < 0 {
            Interval::from_range(a.max(c), -1, width)
        } else {
            Interval::Top
        }
    }

    /// Bitwise exclusive or.
    pub fn xor(&self, rhs: &Interval, width: IntWidth) -> Interval {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Interval::Bottom;
        };
        if a == b && c == d {
            return Interval::constant(a ^ c);
        }
        if a >= 0 && c >= 0 {
            Interval::from_range(0, low_mask(b.max(d)), width)
        } else if b < 0 && d < 0 {
            // x ^ y == !x ^ !y, and both complements are non-negative.
            Interval::from_range(0, low_mask((!a).max(!c)), width)
        } else {
            Interval::Top
        }
    }

    // ---------------------------------------------------------------------
    // Casts
    // ---------------------------------------------------------------------

    /// Sign extension from `from` to a wider `to`.
    pub fn sext(&self, from: IntWidth, to: IntWidth) -> Interval {
        let Some((a, b)) = self.range(from) else {
            return Interval::Bottom;
        };
        if from.is_bool() {
            // A set bit extends to -1.
            let lo = if b >= 1 { -1 } else { 0 };
            let hi = if a <= 0 { 0 } else { -1 };
            return Interval::from_range(lo, hi, to);
        }
        Interval::from_range(a, b, to)
    }

    /// Zero extension from `from` to a wider `to`.
    pub fn zext(&self, from: IntWidth, to: IntWidth) -> Interval {
        let Some((a, b)) = self.range(from) else {
            return Interval::Bottom;
        };
        if from.is_bool() {
            return Interval::from_range(a, b, to);
        }
        let mut parts = Vec::with_capacity(2);
        if b >= 0 {
            parts.push((a.max(0) as i128, b as i128));
        }
        if a < 0 {
            let modulus = from.modulus();
            parts.push((a as i128 + modulus, b.min(-1) as i128 + modulus));
        }
        match hull(parts.into_iter().flat_map(|(lo, hi)| [lo, hi])) {
            Some((lo, hi)) if hi <= to.max_value() as i128 => Interval::from_range(lo as i64, hi as i64, to),
            Some(_) => Interval::Top,
            None => Interval::Bottom,
        }
    }

    /// Truncation from `from` to a narrower `to`, keeping the low bits.
    pub fn trunc(&self, from: IntWidth, to: IntWidth) -> Interval {
        let Some((a, b)) = self.range(from) else {
            return Interval::Bottom;
        };
        if to.is_bool() {
            return if a == b {
                Interval::constant(a & 1)
            } else {
                Interval::from_range(0, 1, to)
            };
        }
        if to.contains(a) && to.contains(b) {
            Interval::from_range(a, b, to)
        } else {
            fit(big(a), big(b), to, Overflow::Wrap).value
        }
    }

    // ---------------------------------------------------------------------
    // Comparisons
    // ---------------------------------------------------------------------

    /// Refine `self` under the assumption that `self <pred> rhs` holds.
    ///
    /// Returns bottom when the comparison can never hold. Bounds that are not
    /// tightened keep their original (possibly infinite) form. Unsigned
    /// predicates refine exactly when both sides are non-negative and
    /// conservatively otherwise.
    ///
    /// ```rust
    /// use vsa_rs::interval::Interval;
    /// use vsa_rs::ir::Predicate;
    /// use vsa_rs::types::IntWidth;
    ///
    /// let x = Interval::Top;
    /// let ten = Interval::constant(10);
    /// assert_eq!(x.refine(Predicate::Slt, &ten, IntWidth::I32), Interval::at_most(9));
    /// assert_eq!(x.refine(Predicate::Sge, &ten, IntWidth::I32), Interval::at_least(10));
    /// ```
    pub fn refine(&self, pred: Predicate, rhs: &Interval, width: IntWidth) -> Interval {
        let Some(((a, b), (c, d))) = self.operands(rhs, width) else {
            return Interval::Bottom;
        };
        let (a, b, c, d) = (a as i128, b as i128, c as i128, d as i128);
        let (lo, hi) = match pred {
            Predicate::Eq => (c, d),
            Predicate::Ne => {
                if c != d {
                    return *self;
                } else if a == c && b == c {
                    return Interval::Bottom;
                } else if a == c {
                    (a + 1, b)
                } else if b == c {
                    (a, b - 1)
                } else {
                    return *self;
                }
            }
            Predicate::Slt => (a, d - 1),
            Predicate::Sle => (a, d),
            Predicate::Sgt => (c + 1, b),
            Predicate::Sge => (c, b),
            // A negative `self` is a huge unsigned value and cannot be below
            // a non-negative `rhs`.
            Predicate::Ult if c >= 0 => (0, d - 1),
            Predicate::Ule if c >= 0 => (0, d),
            // A non-negative `self` can only exceed the non-negative part of `rhs`.
            Predicate::Ugt if a >= 0 => {
                if d < 0 {
                    return Interval::Bottom;
                }
                (c.max(0) + 1, b)
            }
            Predicate::Uge if a >= 0 => {
                if d < 0 {
                    return Interval::Bottom;
                }
                (c.max(0), b)
            }
            Predicate::Ult | Predicate::Ule | Predicate::Ugt | Predicate::Uge => return *self,
        };
        let (lo, hi) = (lo.max(a), hi.min(b));
        if lo > hi {
            return Interval::Bottom;
        }
        self.with_range(lo, hi, (a, b))
    }

    /// Refine for both outcomes of a comparison: `(true edge, false edge)`.
    pub fn refine_pair(&self, pred: Predicate, rhs: &Interval, width: IntWidth) -> (Interval, Interval) {
        (self.refine(pred, rhs, width), self.refine(pred.inverse(), rhs, width))
    }

    /// Remove a single value from the interval where representable.
    pub fn remove(&self, value: i64, width: IntWidth) -> Interval {
        self.refine(Predicate::Ne, &Interval::constant(value), width)
    }

    /// Boolean interval of `self <pred> rhs`: `[1, 1]` if it always holds,
    /// `[0, 0]` if it never does, `[0, 1]` if both are possible and bottom if
    /// either operand is bottom.
    pub fn compare(&self, pred: Predicate, rhs: &Interval, width: IntWidth) -> Interval {
        if let (Some(x), Some(y)) = (self.as_constant(), rhs.as_constant()) {
            return Interval::constant(pred.evaluate(x, y, width) as i64);
        }
        let may_hold = self.satisfiable(pred, rhs, width);
        let may_fail = self.satisfiable(pred.inverse(), rhs, width);
        match (may_hold, may_fail) {
            (true, true) => Interval::from_bounds(0, 1),
            (true, false) => Interval::constant(1),
            (false, true) => Interval::constant(0),
            (false, false) => Interval::Bottom,
        }
    }

    fn satisfiable(&self, pred: Predicate, rhs: &Interval, width: IntWidth) -> bool {
        !self.refine(pred, rhs, width).is_bottom() && !rhs.refine(pred.swapped(), self, width).is_bottom()
    }

    /// Rebuild with concrete bounds `[lo, hi]`, keeping the original bound
    /// wherever it was not tightened.
    fn with_range(&self, lo: i128, hi: i128, (a, b): (i128, i128)) -> Interval {
        let Some((old_lo, old_hi)) = self.bounds() else {
            return Interval::Bottom;
        };
        let lo = if lo == a { old_lo } else { Bound::Finite(lo as i64) };
        let hi = if hi == b { old_hi } else { Bound::Finite(hi as i64) };
        Interval::new(lo, hi)
    }
}

impl AbstractDomain for Interval {
    fn bottom() -> Self {
        Interval::Bottom
    }

    fn top() -> Self {
        Interval::Top
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Interval::Bottom)
    }

    fn is_top(&self) -> bool {
        matches!(self, Interval::Top)
    }

    fn leq(&self, other: &Self) -> bool {
        match (self.bounds(), other.bounds()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some((l1, h1)), Some((l2, h2))) => l2 <= l1 && h1 <= h2,
        }
    }

    fn join(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) => *other,
            (_, None) => *self,
            (Some((l1, h1)), Some((l2, h2))) => Interval::new(l1.min(l2), h1.max(h2)),
        }
    }

    fn meet(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (Some((l1, h1)), Some((l2, h2))) => Interval::new(l1.max(l2), h1.min(h2)),
            _ => Interval::Bottom,
        }
    }

    fn widen(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (None, _) => *other,
            (_, None) => *self,
            (Some((l1, h1)), Some((l2, h2))) => {
                let lo = if l2 < l1 { Bound::NegInf } else { l1 };
                let hi = if h2 > h1 { Bound::PosInf } else { h1 };
                Interval::new(lo, hi)
            }
        }
    }

    fn narrow(&self, other: &Self) -> Self {
        match (self.bounds(), other.bounds()) {
            (Some((l1, h1)), Some((l2, h2))) => {
                let lo = if l1 == Bound::NegInf { l2 } else { l1 };
                let hi = if h1 == Bound::PosInf { h2 } else { h1 };
                Interval::new(lo, hi)
            }
            _ => Interval::Bottom,
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Bottom
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Bottom => write!(f, "⊥"),
            Interval::Top => write!(f, "⊤"),
            Interval::Bounded(lo, hi) => write!(f, "[{}, {}]", lo, hi),
        }
    }
}

/// Result of an abstract operation that may fault at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Values produced by the executions that do not fault.
    pub value: Interval,
    /// Some execution may overflow under [`Overflow::NoWrap`].
    pub overflow: bool,
    /// Some execution may divide by zero.
    pub div_by_zero: bool,
}

impl Outcome {
    /// Outcome without any possible fault.
    pub fn exact(value: Interval) -> Self {
        Self {
            value,
            overflow: false,
            div_by_zero: false,
        }
    }

    fn overflowed(value: Interval) -> Self {
        Self {
            value,
            overflow: true,
            div_by_zero: false,
        }
    }
}

impl From<Interval> for Outcome {
    fn from(value: Interval) -> Self {
        Outcome::exact(value)
    }
}

fn big(value: i64) -> BigInt {
    BigInt::from(value)
}

/// Smallest and largest element of a sequence.
fn hull<T: Ord + Clone>(values: impl IntoIterator<Item = T>) -> Option<(T, T)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v.clone(), v)),
        Some((lo, hi)) => Some((lo.min(v.clone()), hi.max(v))),
    })
}

/// Fit an exact range `[lo, hi]` into `width` bits.
fn fit(lo: BigInt, hi: BigInt, width: IntWidth, overflow: Overflow) -> Outcome {
    if lo > hi {
        return Outcome::exact(Interval::Bottom);
    }
    let min = big(width.min_value());
    let max = big(width.max_value());
    if lo >= min && hi <= max {
        return match (i64::try_from(&lo), i64::try_from(&hi)) {
            (Ok(lo), Ok(hi)) => Outcome::exact(Interval::from_range(lo, hi, width)),
            _ => Outcome::exact(Interval::Top),
        };
    }
    match overflow {
        Overflow::NoWrap => {
            if hi < min || lo > max {
                return Outcome::overflowed(Interval::Top);
            }
            let lo = match i64::try_from(&lo) {
                Ok(v) if lo >= min => Bound::Finite(v),
                _ => Bound::NegInf,
            };
            let hi = match i64::try_from(&hi) {
                Ok(v) if hi <= max => Bound::Finite(v),
                _ => Bound::PosInf,
            };
            Outcome::overflowed(Interval::new(lo, hi))
        }
        Overflow::Wrap => Outcome::exact(wrap(&lo, &hi, width)),
    }
}

/// Two's-complement reduction of `[lo, hi]` into `width` bits.
fn wrap(lo: &BigInt, hi: &BigInt, width: IntWidth) -> Interval {
    let (Ok(lo), Ok(hi)) = (i128::try_from(lo), i128::try_from(hi)) else {
        return Interval::Top;
    };
    let modulus = width.modulus();
    match hi.checked_sub(lo) {
        Some(span) if span < modulus - 1 => {}
        _ => return Interval::Top,
    }
    let min = width.min_value() as i128;
    let reduce = |v: i128| (v - min).rem_euclid(modulus) + min;
    let (lo, hi) = (reduce(lo), reduce(hi));
    if lo <= hi {
        Interval::from_range(lo as i64, hi as i64, width)
    } else {
        Interval::Top
    }
}

/// Outcome for a divisor range that is exactly zero, or contains zero under
/// [`DivisionPolicy::Top`].
fn zero_divisor(c: i64, d: i64, policy: DivisionPolicy) -> Option<Outcome> {
    let value = if c == 0 && d == 0 {
        Interval::Bottom
    } else if c <= 0 && d >= 0 && policy == DivisionPolicy::Top {
        Interval::Top
    } else {
        return None;
    };
    Some(Outcome {
        value,
        overflow: false,
        div_by_zero: true,
    })
}

/// The negative and positive sub-ranges of `[lo, hi]`.
fn nonzero_parts(lo: i64, hi: i64) -> impl Iterator<Item = (i64, i64)> {
    let negative = (lo <= -1).then(|| (lo, hi.min(-1)));
    let positive = (hi >= 1).then(|| (lo.max(1), hi));
    negative.into_iter().chain(positive)
}

fn valid_shift(lo: i64, hi: i64, width: IntWidth) -> bool {
    lo >= 0 && hi < width.bits() as i64
}

/// All-ones mask covering the bit length of a non-negative `x`.
fn low_mask(x: i64) -> i64 {
    if x <= 0 {
        0
    } else {
        (u64::MAX >> x.leading_zeros()) as i64
    }
}
