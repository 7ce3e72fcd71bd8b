//! Errors that abort the analysis of a function.
//!
//! Potential runtime faults found by the analysis (division by zero, overflow,
//! out-of-bounds indexing) are *not* errors: they are reported as
//! [`Risk`](crate::risk::Risk)s. Only malformed input and internal invariant
//! violations end up here.

use crate::types::{BlockId, InstLoc, IntWidth, VarId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("function has no basic blocks")]
    EmptyFunction,
    #[error("block {block} has no terminator")]
    MissingTerminator { block: BlockId },
    #[error("block {block} jumps to nonexistent block {target}")]
    DanglingSuccessor { block: BlockId, target: BlockId },
    #[error("phi at {loc} has an incoming value from {pred}, which is not a predecessor")]
    DanglingPhiSource { loc: InstLoc, pred: BlockId },
    #[error("phi at {loc} has no incoming value from predecessor {pred}")]
    IncompletePhi { loc: InstLoc, pred: BlockId },
    #[error("variable {var} is defined more than once")]
    DuplicateDefinition { var: VarId },
    #[error("variable {var} used in {block} is never defined")]
    UndefinedVariable { block: BlockId, var: VarId },
    #[error("parameter {var} has an empty or unrepresentable range [{lo}, {hi}] for {width}")]
    InvalidParameterRange { var: VarId, lo: i64, hi: i64, width: IntWidth },
    #[error("{var} used at {loc} has width {found}, expected {expected}")]
    WidthMismatch {
        loc: InstLoc,
        var: VarId,
        expected: IntWidth,
        found: IntWidth,
    },
    #[error("constant {value} does not fit in {width}")]
    ConstantOutOfRange { value: i64, width: IntWidth },
    #[error("cast at {loc} does not change the width in the declared direction")]
    InvalidCast { loc: InstLoc },
    #[error("branch condition {var} in {block} is not a 1-bit value")]
    InvalidBranchCondition { block: BlockId, var: VarId },

    #[error("widening at {block} produced a state below the previous one")]
    NonMonotonicWidening { block: BlockId },
    #[error("widening point {block} did not stabilise after {limit} widenings")]
    WideningLimitExceeded { block: BlockId, limit: usize },
}

impl AnalysisError {
    /// Check if this error is an internal invariant violation, as opposed to
    /// malformed input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            AnalysisError::NonMonotonicWidening { .. } | AnalysisError::WideningLimitExceeded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_error_classification() {
        let input = AnalysisError::MissingTerminator { block: BlockId::new(2) };
        assert!(!input.is_invariant_violation());
        assert_eq!(input.to_string(), "block bb2 has no terminator");

        let internal = AnalysisError::WideningLimitExceeded {
            block: BlockId::new(1),
            limit: 5,
        };
        assert!(internal.is_invariant_violation());
    }
}
