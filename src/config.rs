//! Analysis configuration.

/// How division and remainder treat a divisor interval that contains zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DivisionPolicy {
    /// Divide by the negative and positive parts of the divisor separately
    /// and join the results.
    #[default]
    Split,
    /// Give up and return `Top`.
    Top,
}

/// Configuration options for the fixpoint engine.
///
/// Use `AnalysisConfig::default()` for standard settings and struct-update
/// syntax to override individual fields.
///
/// # Examples
///
/// ```
/// use vsa_rs::config::{AnalysisConfig, DivisionPolicy};
///
/// let config = AnalysisConfig {
///     widening_delay: 0,
///     division: DivisionPolicy::Top,
///     ..AnalysisConfig::default()
/// };
/// assert_eq!(config.narrowing_passes, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Number of changing updates a widening point accepts with plain join
    /// before widening kicks in (default: 2)
    pub widening_delay: usize,
    /// Passes of the descending (narrowing) phase; `None` means one pass per
    /// basic block, `Some(0)` disables narrowing (default: `None`)
    pub narrowing_passes: Option<usize>,
    /// Ceiling on worklist pops during the ascending phase (default: 10000)
    pub max_iterations: usize,
    /// Changing widenings allowed per widening point before the engine
    /// reports an invariant violation; `None` means `3 * variables + 2`
    /// (default: `None`)
    pub max_widenings: Option<usize>,
    /// Treatment of divisors that may be zero (default: `Split`)
    pub division: DivisionPolicy,
    /// Report possible division or remainder by zero (default: true)
    pub report_division_by_zero: bool,
    /// Report possible overflow of non-wrapping arithmetic (default: true)
    pub report_overflow: bool,
    /// Report possibly out-of-bounds indexing (default: true)
    pub report_out_of_bounds: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            widening_delay: 2,
            narrowing_passes: None,
            max_iterations: 10_000,
            max_widenings: None,
            division: DivisionPolicy::Split,
            report_division_by_zero: true,
            report_overflow: true,
            report_out_of_bounds: true,
        }
    }
}

impl AnalysisConfig {
    /// Number of narrowing passes for a function with `blocks` basic blocks.
    pub fn narrowing_passes_for(&self, blocks: usize) -> usize {
        self.narrowing_passes.unwrap_or(blocks)
    }

    /// Widening limit for a function defining `variables` variables.
    ///
    /// Each variable has two bounds that may each escape to infinity once,
    /// and a widened state may in turn unblock a refinement elsewhere.
    pub fn max_widenings_for(&self, variables: usize) -> usize {
        self.max_widenings.unwrap_or(3 * variables + 2)
    }
}
