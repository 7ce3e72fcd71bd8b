//! Potential runtime faults found by the analysis.

use std::fmt;

use crate::interval::Interval;
use crate::types::InstLoc;

/// Kind of potential runtime fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskKind {
    /// Divisor interval of a division or remainder includes zero.
    DivisionByZero,
    /// Non-wrapping arithmetic may leave the representable range.
    SignedOverflow,
    /// Index interval may be negative or reach the length.
    OutOfBounds,
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskKind::DivisionByZero => f.pad("division by zero"),
            RiskKind::SignedOverflow => f.pad("signed overflow"),
            RiskKind::OutOfBounds => f.pad("out-of-bounds index"),
        }
    }
}

/// A flagged instruction.
///
/// `witness` is the interval that exhibits the risk: the divisor for
/// [`RiskKind::DivisionByZero`], the result with its overflowing bounds
/// escaped to infinity for [`RiskKind::SignedOverflow`], and the index for
/// [`RiskKind::OutOfBounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Risk {
    pub loc: InstLoc,
    pub kind: RiskKind,
    pub witness: Interval,
}

impl Risk {
    pub fn new(loc: InstLoc, kind: RiskKind, witness: Interval) -> Self {
        Self { loc, kind, witness }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: possible {} (witness {})", self.loc, self.kind, self.witness)
    }
}
