//! Worklist fixpoint engine with widening and narrowing.
//!
//! The engine analyses one [`Function`] at a time in three phases:
//!
//! 1. **Ascending.** Blocks are popped from a worklist in reverse postorder.
//!    A block's entry state is the join of the states flowing along its
//!    incoming edges, with phi nodes bound from the matching edge. At
//!    widening points (loop headers) the entry state is widened once it has
//!    changed [`widening_delay`] times. The block's instructions are then
//!    evaluated, and every successor whose edge state changed is queued.
//! 2. **Descending.** Starting from the post-fixpoint, blocks are recomputed
//!    in reverse postorder, narrowing at widening points and intersecting
//!    elsewhere, for a bounded number of passes or until nothing changes.
//! 3. **Reporting.** Risks are collected in one final pass over the
//!    resulting states, so values that only appear transiently during
//!    widening are never reported.
//!
//! [`widening_delay`]: AnalysisConfig::widening_delay
//!
//! # Example
//!
//! ```rust
//! use vsa_rs::config::AnalysisConfig;
//! use vsa_rs::fixpoint::FixpointEngine;
//! use vsa_rs::interval::Interval;
//! use vsa_rs::ir::{BinaryOp, FunctionBuilder};
//! use vsa_rs::types::{BlockId, IntWidth};
//!
//! let mut b = FunctionBuilder::new("f");
//! let x = b.copy(5, IntWidth::I32);
//! let y = b.binary(BinaryOp::Add, x, 3, IntWidth::I32);
//! b.ret(Some(y.into()));
//! let function = b.finish()?;
//!
//! let config = AnalysisConfig::default();
//! let result = FixpointEngine::new(&config).analyze(&function)?;
//! assert_eq!(result.value_at(BlockId::ENTRY, y), Interval::constant(8));
//! assert_eq!(result.return_range, Interval::constant(8));
//! # Ok::<(), vsa_rs::error::AnalysisError>(())
//! ```

use std::fmt;

use crate::config::AnalysisConfig;
use crate::domain::AbstractDomain;
use crate::dominators::Dominators;
use crate::error::{AnalysisError, Result};
use crate::interval::Interval;
use crate::ir::{Function, Terminator};
use crate::risk::Risk;
use crate::state::AbstractState;
use crate::transfer::{CallSummary, NoSummary, TransferFunction};
use crate::types::{BlockId, VarId};
use crate::worklist::Worklist;

/// Processing status of a block during the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockStatus {
    /// Never reached by a feasible edge.
    #[default]
    Unvisited,
    /// Pending for the first time.
    Queued,
    /// Evaluated at least once.
    Processed,
    /// Pending again after its inputs changed.
    Requeued,
    /// Part of the final fixpoint.
    Stable,
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockStatus::Unvisited => "unvisited",
            BlockStatus::Queued => "queued",
            BlockStatus::Processed => "processed",
            BlockStatus::Requeued => "requeued",
            BlockStatus::Stable => "stable",
        };
        f.pad(name)
    }
}

/// Abstract states at the boundaries of a basic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStates {
    /// State before the first non-phi instruction, with phi nodes bound.
    pub entry: AbstractState,
    /// State after the last instruction, before edge refinement.
    pub exit: AbstractState,
}

impl Default for BlockStates {
    fn default() -> Self {
        Self {
            entry: AbstractState::unreachable(),
            exit: AbstractState::unreachable(),
        }
    }
}

/// Counters describing one run of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixpointStats {
    /// Worklist pops in the ascending phase.
    pub iterations: usize,
    /// Widenings that changed a state.
    pub widenings: usize,
    /// Narrowing passes run.
    pub narrowing_passes: usize,
    /// `false` if the ascending phase hit the iteration ceiling.
    pub converged: bool,
}

/// Result of analysing one function.
#[derive(Debug, Clone)]
pub struct FunctionAnalysis {
    /// Name of the analysed function.
    pub name: String,
    /// Entry and exit states, indexed by block.
    pub states: Vec<BlockStates>,
    /// Final status of each block.
    pub status: Vec<BlockStatus>,
    /// Potential runtime faults, in reverse postorder of their blocks.
    ///
    /// If [`FixpointStats::converged`] is `false` the states are not a
    /// post-fixpoint and this list may be incomplete.
    pub risks: Vec<Risk>,
    /// Join of all values that may be returned. Like [`risks`](Self::risks),
    /// only sound if the analysis converged.
    pub return_range: Interval,
    pub stats: FixpointStats,
}

impl FunctionAnalysis {
    pub fn entry(&self, block: BlockId) -> &AbstractState {
        &self.states[block.index()].entry
    }

    pub fn exit(&self, block: BlockId) -> &AbstractState {
        &self.states[block.index()].exit
    }

    pub fn block_status(&self, block: BlockId) -> BlockStatus {
        self.status[block.index()]
    }

    /// Check if some execution may reach the block.
    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.states[block.index()].entry.is_reachable()
    }

    /// Interval of a variable at the end of a block.
    pub fn value_at(&self, block: BlockId, var: VarId) -> Interval {
        self.exit(block).get(var)
    }

    /// Interval of a variable over the ends of all blocks.
    pub fn value(&self, var: VarId) -> Interval {
        Interval::join_many(self.states.iter().map(|s| s.exit.get(var)))
    }
}

/// Fixpoint engine, configured once and reusable across functions.
#[derive(Clone, Copy)]
pub struct FixpointEngine<'a> {
    config: &'a AnalysisConfig,
    summary: &'a dyn CallSummary,
}

impl<'a> FixpointEngine<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            summary: &NoSummary,
        }
    }

    /// Use `summary` to evaluate calls.
    pub fn with_summary(self, summary: &'a dyn CallSummary) -> Self {
        Self { summary, ..self }
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.config
    }

    /// Analyse a function.
    ///
    /// The function is validated first; malformed input is rejected without
    /// any analysis. An error is also returned if the widening invariants
    /// are violated during the ascending phase.
    pub fn analyze(&self, function: &Function) -> Result<FunctionAnalysis> {
        function.validate()?;
        log::info!(
            "Analyzing function {} ({} blocks, {} variables)",
            function.name,
            function.num_blocks(),
            function.num_vars()
        );
        let mut run = Run::new(function, self.config, self.summary);
        run.ascend()?;
        if run.stats.converged {
            run.descend();
            run.mark_stable();
        }
        Ok(run.finish())
    }
}

impl fmt::Debug for FixpointEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixpointEngine").field("config", self.config).finish_non_exhaustive()
    }
}

/// Per-block record maintained by the engine.
#[derive(Debug, Clone, Default)]
struct BlockRecord {
    states: BlockStates,
    status: BlockStatus,
    visits: usize,
    /// Changes of the entry state so far, driving the widening delay.
    changes: usize,
    widenings: usize,
}

/// State of one analysis run.
struct Run<'f> {
    function: &'f Function,
    config: &'f AnalysisConfig,
    doms: Dominators,
    tf: TransferFunction<'f>,
    preds: Vec<Vec<BlockId>>,
    initial: AbstractState,
    records: Vec<BlockRecord>,
    /// Refined state leaving each block along each of its edges.
    out_edges: Vec<Vec<(BlockId, AbstractState)>>,
    stats: FixpointStats,
}

impl<'f> Run<'f> {
    fn new(function: &'f Function, config: &'f AnalysisConfig, summary: &'f dyn CallSummary) -> Self {
        let n = function.num_blocks();
        let mut initial = AbstractState::new();
        for param in &function.params {
            let value = match param.range {
                Some((lo, hi)) => Interval::from_range(lo, hi, param.width),
                None => Interval::Top,
            };
            initial.set(param.var, value);
        }
        Self {
            function,
            config,
            doms: Dominators::new(function),
            tf: TransferFunction::new(function, config, summary),
            preds: function.predecessors(),
            initial,
            records: vec![BlockRecord::default(); n],
            out_edges: vec![Vec::new(); n],
            stats: FixpointStats::default(),
        }
    }

    fn edge(&self, from: BlockId, to: BlockId) -> Option<&AbstractState> {
        self.out_edges[from.index()]
            .iter()
            .find(|(target, _)| *target == to)
            .map(|(_, state)| state)
    }

    /// Join of the incoming edge states of a block, with its phis bound.
    fn incoming(&self, block: BlockId) -> AbstractState {
        let edges: Vec<(BlockId, &AbstractState)> = self.preds[block.index()]
            .iter()
            .filter_map(|&pred| Some((pred, self.edge(pred, block)?)))
            .collect();

        let mut state = if block.is_entry() {
            self.initial.clone()
        } else {
            AbstractState::unreachable()
        };
        for (_, edge) in &edges {
            state = state.join(edge);
        }
        if state.is_reachable() {
            self.tf.apply_phis(self.function.block(block), &edges, &mut state);
        }
        state
    }

    /// Evaluate a block from its stored entry state, updating its exit state
    /// and outgoing edges. Returns the successors whose edge state changed.
    fn evaluate(&mut self, block: BlockId) -> Vec<BlockId> {
        let function = self.function;
        let bb = function.block(block);
        let record = &mut self.records[block.index()];
        let mut exit = record.states.entry.clone();
        self.tf.apply_block(block, bb, &mut exit, &mut Vec::new());
        let edges = self.tf.edge_states(bb, &exit);
        record.states.exit = exit;

        let unreachable = AbstractState::unreachable();
        let old = &self.out_edges[block.index()];
        let changed = edges
            .iter()
            .filter(|(succ, state)| {
                let previous = old.iter().find(|(t, _)| t == succ).map_or(&unreachable, |(_, s)| s);
                state != previous
            })
            .map(|&(succ, _)| succ)
            .collect();
        self.out_edges[block.index()] = edges;
        changed
    }

    fn ascend(&mut self) -> Result<()> {
        let rpo = self.doms.reverse_postorder().to_vec();
        let mut worklist = Worklist::new(&rpo, self.function.num_blocks());
        let limit = self.config.max_widenings_for(self.function.num_vars());

        worklist.push(BlockId::ENTRY);
        self.records[BlockId::ENTRY.index()].status = BlockStatus::Queued;
        self.stats.converged = true;

        while let Some(block) = worklist.pop() {
            if self.stats.iterations >= self.config.max_iterations {
                log::warn!(
                    "Fixpoint computation for {} did not converge after {} iterations",
                    self.function.name,
                    self.config.max_iterations
                );
                self.stats.converged = false;
                break;
            }
            self.stats.iterations += 1;
            log::trace!("Processing {}", block);

            let computed = self.incoming(block);
            let widening = self.doms.is_widening_point(block);
            let record = &mut self.records[block.index()];
            record.status = BlockStatus::Processed;
            let old = &record.states.entry;

            let entry = if widening && record.changes >= self.config.widening_delay {
                let joined = old.join(&computed);
                let widened = old.widen(&joined);
                check_widening(block, &joined, &widened)?;
                if widened != *old {
                    record.widenings += 1;
                    self.stats.widenings += 1;
                    log::debug!("Widening at {}: {}", block, widened);
                    if record.widenings > limit {
                        return Err(AnalysisError::WideningLimitExceeded { block, limit });
                    }
                }
                widened
            } else {
                old.join(&computed)
            };

            let changed = entry != *old;
            if !changed && record.visits > 0 {
                continue;
            }
            if changed {
                record.changes += 1;
            }
            record.visits += 1;
            record.states.entry = entry;

            for succ in self.evaluate(block) {
                if worklist.push(succ) {
                    let status = &mut self.records[succ.index()].status;
                    *status = match *status {
                        BlockStatus::Unvisited => BlockStatus::Queued,
                        _ => BlockStatus::Requeued,
                    };
                }
            }
        }

        log::debug!(
            "Fixpoint converged after {} iterations ({} widenings)",
            self.stats.iterations,
            self.stats.widenings
        );
        Ok(())
    }

    fn descend(&mut self) {
        let rpo = self.doms.reverse_postorder().to_vec();
        let passes = self.config.narrowing_passes_for(self.function.num_blocks());

        for pass in 0..passes {
            let mut changed = false;
            for &block in &rpo {
                if self.records[block.index()].visits == 0 {
                    continue;
                }
                let computed = self.incoming(block);
                let old = &self.records[block.index()].states.entry;
                let entry = if self.doms.is_widening_point(block) {
                    old.narrow(&computed)
                } else {
                    old.meet(&computed)
                };
                if entry == *old {
                    continue;
                }
                log::trace!("Narrowing at {}: {}", block, entry);
                changed = true;
                self.records[block.index()].states.entry = entry;
                self.evaluate(block);
            }
            self.stats.narrowing_passes += 1;
            if !changed {
                log::debug!("Narrowing converged after {} passes", pass + 1);
                break;
            }
        }
    }

    fn mark_stable(&mut self) {
        for record in &mut self.records {
            if record.visits > 0 {
                record.status = BlockStatus::Stable;
            }
        }
    }

    fn finish(self) -> FunctionAnalysis {
        let mut risks = Vec::new();
        let mut return_range = Interval::Bottom;

        for &block in self.doms.reverse_postorder() {
            let bb = self.function.block(block);
            let states = &self.records[block.index()].states;
            if !states.entry.is_reachable() {
                continue;
            }
            let mut state = states.entry.clone();
            self.tf.apply_block(block, bb, &mut state, &mut risks);

            if let Some(Terminator::Return(Some(value))) = &bb.terminator {
                if states.exit.is_reachable() {
                    let returned = TransferFunction::eval_operand(&states.exit, *value);
                    return_range = return_range.join(&returned);
                }
            }
        }

        if !self.stats.converged {
            log::warn!(
                "{}: analysis did not converge, the {} risks found may be incomplete",
                self.function.name,
                risks.len()
            );
        }
        log::debug!("{}: {} risks, returns {}", self.function.name, risks.len(), return_range);

        let (states, status): (Vec<_>, Vec<_>) = self.records.into_iter().map(|r| (r.states, r.status)).unzip();
        FunctionAnalysis {
            name: self.function.name.clone(),
            states,
            status,
            risks,
            return_range,
            stats: self.stats,
        }
    }
}

/// A widened state must cover the join it was computed from, or the ascent
/// could settle below the least fixpoint.
fn check_widening<D: AbstractDomain>(block: BlockId, joined: &D, widened: &D) -> Result<()> {
    if joined.leq(widened) {
        Ok(())
    } else {
        Err(AnalysisError::NonMonotonicWidening { block })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::bound::Bound;
    use crate::ir::{BinaryOp, FunctionBuilder, Operand, Predicate};
    use crate::risk::RiskKind;
    use crate::types::IntWidth;

    const W: IntWidth = IntWidth::I32;

    /// `for (i = 0; i < n; i++) {}` with the header at bb1, the body at bb2
    /// and the exit at bb3. Returns the function and the phi for `i`.
    fn counting_loop(n: i64) -> (Function, VarId) {
        let mut b = FunctionBuilder::new("count");
        let header = b.new_block();
        let body = b.new_block();
        let exit = b.new_block();
        b.jump(header);

        b.switch_to(header);
        let i = b.phi(W);
        let c = b.cmp(Predicate::Slt, i, n, W);
        b.branch(c, body, exit);

        b.switch_to(body);
        let next = b.binary(BinaryOp::Add, i, 1, W);
        b.jump(header);

        b.switch_to(exit);
        b.ret(Some(i.into()));

        b.add_incoming(i, BlockId::ENTRY, 0);
        b.add_incoming(i, body, next);
        (b.finish().unwrap(), i)
    }

    #[test]
    fn test_loop_without_narrowing() {
        let (f, i) = counting_loop(10);
        let config = AnalysisConfig {
            narrowing_passes: Some(0),
            ..AnalysisConfig::default()
        };
        let result = FixpointEngine::new(&config).analyze(&f).unwrap();

        let header = BlockId::new(1);
        assert_eq!(result.entry(header).get(i), Interval::at_least(0));
        assert_eq!(result.entry(BlockId::new(2)).get(i), Interval::from_bounds(0, 9));
        assert!(result.stats.widenings >= 1);
        assert_eq!(result.stats.narrowing_passes, 0);
        assert!(result.stats.converged);
    }

    #[test]
    fn test_loop_with_narrowing() {
        let (f, i) = counting_loop(10);
        let config = AnalysisConfig::default();
        let result = FixpointEngine::new(&config).analyze(&f).unwrap();

        assert_eq!(result.entry(BlockId::new(1)).get(i), Interval::from_bounds(0, 10));
        assert_eq!(result.entry(BlockId::new(2)).get(i), Interval::from_bounds(0, 9));
        assert_eq!(result.entry(BlockId::new(3)).get(i), Interval::constant(10));
        assert_eq!(result.return_range, Interval::constant(10));
        assert!(result.risks.is_empty());
        assert!(result.stats.narrowing_passes >= 1);
    }

    #[test]
    fn test_block_status() {
        let mut b = FunctionBuilder::new("dead");
        let dead = b.new_block();
        b.ret(Some(Operand::Const(0)));
        b.switch_to(dead);
        let x = b.copy(1, W);
        b.ret(Some(x.into()));
        let f = b.finish().unwrap();

        let config = AnalysisConfig::default();
        let result = FixpointEngine::new(&config).analyze(&f).unwrap();

        assert_eq!(result.block_status(BlockId::ENTRY), BlockStatus::Stable);
        assert_eq!(result.block_status(dead), BlockStatus::Unvisited);
        assert!(!result.is_reachable(dead));
        assert_eq!(result.value_at(dead, x), Interval::Bottom);
        assert_eq!(result.return_range, Interval::constant(0));
    }

    #[test]
    fn test_iteration_ceiling() {
        let (f, _) = counting_loop(1000);
        let config = AnalysisConfig {
            max_iterations: 3,
            ..AnalysisConfig::default()
        };
        let result = FixpointEngine::new(&config).analyze(&f).unwrap();

        assert!(!result.stats.converged);
        assert_eq!(result.stats.iterations, 3);
        assert_eq!(result.stats.narrowing_passes, 0);
    }

    #[test]
    fn test_widening_limit() {
        let (f, _) = counting_loop(10);
        let config = AnalysisConfig {
            widening_delay: 0,
            max_widenings: Some(0),
            ..AnalysisConfig::default()
        };
        let err = FixpointEngine::new(&config).analyze(&f).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(matches!(err, AnalysisError::WideningLimitExceeded { limit: 0, .. }));
    }

    #[test]
    fn test_widening_below_join_rejected() {
        let block = BlockId::new(1);
        let joined = Interval::from_bounds(0, 10);
        assert_eq!(check_widening(block, &joined, &Interval::Top), Ok(()));
        assert_eq!(check_widening(block, &joined, &joined), Ok(()));
        let err = check_widening(block, &joined, &Interval::from_bounds(0, 5)).unwrap_err();
        assert_eq!(err, AnalysisError::NonMonotonicWidening { block });
        assert!(err.is_invariant_violation());

        let x = VarId::new(0);
        let y = VarId::new(1);
        let joined = AbstractState::new()
            .with(x, Interval::from_bounds(0, 1))
            .with(y, Interval::from_bounds(0, 10));
        let widened = joined.widen(&joined.with(x, Interval::from_bounds(0, 2)));
        assert_eq!(check_widening(block, &joined, &widened), Ok(()));
        // Dropping a bound variable loses the values it held.
        let lossy = AbstractState::new().with(x, Interval::Top);
        assert!(matches!(
            check_widening(block, &joined, &lossy),
            Err(AnalysisError::NonMonotonicWidening { .. })
        ));
        assert!(matches!(
            check_widening(block, &joined, &AbstractState::unreachable()),
            Err(AnalysisError::NonMonotonicWidening { .. })
        ));
    }

    #[test]
    fn test_risks_incomplete_without_convergence() {
        // for (i = 0; i < 100; i++) q = 1000 / (i - 50);
        let mut b = FunctionBuilder::new("divide");
        let header = b.new_block();
        let body = b.new_block();
        let exit = b.new_block();
        b.jump(header);
        b.switch_to(header);
        let i = b.phi(W);
        let c = b.cmp(Predicate::Slt, i, 100, W);
        b.branch(c, body, exit);
        b.switch_to(body);
        let d = b.binary(BinaryOp::Sub, i, 50, W);
        b.binary(BinaryOp::SDiv, 1000, d, W);
        let next = b.binary(BinaryOp::Add, i, 1, W);
        b.jump(header);
        b.switch_to(exit);
        b.ret(Some(i.into()));
        b.add_incoming(i, BlockId::ENTRY, 0);
        b.add_incoming(i, body, next);
        let f = b.finish().unwrap();

        let config = AnalysisConfig::default();
        let full = FixpointEngine::new(&config).analyze(&f).unwrap();
        assert!(full.stats.converged);
        assert_eq!(full.risks.len(), 1);
        assert_eq!(full.return_range, Interval::constant(100));

        // The ceiling is hit before the loop body is ever evaluated.
        let config = AnalysisConfig {
            max_iterations: 2,
            ..AnalysisConfig::default()
        };
        let partial = FixpointEngine::new(&config).analyze(&f).unwrap();
        assert!(!partial.stats.converged);
        assert!(!partial.is_reachable(body));
        assert!(partial.risks.is_empty());
        assert_eq!(partial.block_status(body), BlockStatus::Queued);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let mut b = FunctionBuilder::new("broken");
        b.new_block();
        b.ret(None);
        let f = b.finish_unchecked();

        let config = AnalysisConfig::default();
        let err = FixpointEngine::new(&config).analyze(&f).unwrap_err();
        assert_eq!(err, AnalysisError::MissingTerminator { block: BlockId::new(1) });
        assert!(!err.is_invariant_violation());
    }

    #[test]
    fn test_risk_reported_once_on_final_states() {
        // for (i = 0; i < 100; i++) { q = 1000 / (i - 50); m = i * 1000000; }
        let mut b = FunctionBuilder::new("divide");
        let header = b.new_block();
        let body = b.new_block();
        let exit = b.new_block();
        b.jump(header);

        b.switch_to(header);
        let i = b.phi(W);
        let c = b.cmp(Predicate::Slt, i, 100, W);
        b.branch(c, body, exit);

        b.switch_to(body);
        let d = b.binary(BinaryOp::Sub, i, 50, W);
        let q = b.binary(BinaryOp::SDiv, 1000, d, W);
        let m = b.binary(BinaryOp::Mul, i, 1_000_000, W);
        let next = b.binary(BinaryOp::Add, i, 1, W);
        b.jump(header);

        b.switch_to(exit);
        b.ret(None);

        b.add_incoming(i, BlockId::ENTRY, 0);
        b.add_incoming(i, body, next);
        let f = b.finish().unwrap();

        let config = AnalysisConfig::default();
        let result = FixpointEngine::new(&config).analyze(&f).unwrap();

        assert_eq!(result.risks.len(), 1);
        assert_eq!(result.risks[0].kind, RiskKind::DivisionByZero);
        assert_eq!(result.risks[0].loc, crate::types::InstLoc::new(body, 1));
        assert_eq!(result.risks[0].witness, Interval::from_bounds(-50, 49));
        assert_eq!(result.value_at(body, q), Interval::from_bounds(-1000, 1000));
        assert_eq!(result.value_at(body, m), Interval::from_bounds(0, 99_000_000));
    }

    #[test]
    fn test_overflow_in_unbounded_loop() {
        // while (true) i++: the increment may overflow.
        let mut b = FunctionBuilder::new("forever");
        let header = b.new_block();
        b.jump(header);
        b.switch_to(header);
        let i = b.phi(W);
        let next = b.binary(BinaryOp::Add, i, 1, W);
        b.jump(header);
        b.add_incoming(i, BlockId::ENTRY, 0);
        b.add_incoming(i, header, next);
        let f = b.finish().unwrap();

        let config = AnalysisConfig::default();
        let result = FixpointEngine::new(&config).analyze(&f).unwrap();

        assert_eq!(result.entry(header).get(i), Interval::at_least(0));
        assert_eq!(result.value_at(header, next), Interval::new(Bound::Finite(1), Bound::PosInf));
        assert_eq!(result.risks.len(), 1);
        assert_eq!(result.risks[0].kind, RiskKind::SignedOverflow);
        assert_eq!(result.return_range, Interval::Bottom);
    }

}
