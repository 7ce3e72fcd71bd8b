//! Abstract transfer functions for instructions and terminators.
//!
//! Implements the abstract semantics `⟦inst⟧♯: AbstractState → AbstractState`
//! for every [`InstKind`], and for terminators the refined state carried by
//! each outgoing edge.

use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::domain::AbstractDomain;
use crate::interval::{Interval, Outcome};
use crate::ir::{BasicBlock, BinaryOp, CastOp, Function, InstKind, Instruction, Operand, Predicate, Terminator};
use crate::risk::{Risk, RiskKind};
use crate::state::AbstractState;
use crate::types::{BlockId, InstLoc, IntWidth, VarId};

/// Host-supplied knowledge about called functions.
///
/// Without a summary, the result of a call is `Top`.
pub trait CallSummary: Send + Sync {
    /// Interval of the value returned by `callee` when called with arguments
    /// in the given intervals, or `None` if nothing is known.
    fn summarize(&self, callee: &str, args: &[Interval], width: IntWidth) -> Option<Interval>;
}

/// Summary that knows nothing: every call returns `Top`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSummary;

impl CallSummary for NoSummary {
    fn summarize(&self, _callee: &str, _args: &[Interval], _width: IntWidth) -> Option<Interval> {
        None
    }
}

impl<F> CallSummary for F
where
    F: Fn(&str, &[Interval], IntWidth) -> Option<Interval> + Send + Sync,
{
    fn summarize(&self, callee: &str, args: &[Interval], width: IntWidth) -> Option<Interval> {
        self(callee, args, width)
    }
}

/// A comparison whose 1-bit result drives a branch.
#[derive(Debug, Clone, Copy)]
struct Condition {
    pred: Predicate,
    lhs: Operand,
    rhs: Operand,
    width: IntWidth,
}

/// Transfer function evaluator for one function.
pub struct TransferFunction<'a> {
    config: &'a AnalysisConfig,
    summary: &'a dyn CallSummary,
    /// Comparison defining each 1-bit variable, for branch refinement.
    conditions: HashMap<VarId, Condition>,
}

impl<'a> TransferFunction<'a> {
    pub fn new(function: &Function, config: &'a AnalysisConfig, summary: &'a dyn CallSummary) -> Self {
        let conditions = function
            .blocks
            .iter()
            .flat_map(|block| block.instructions.iter())
            .filter_map(|inst| match (&inst.kind, inst.dest) {
                (&InstKind::Cmp { pred, lhs, rhs, width }, Some(dest)) => Some((dest, Condition { pred, lhs, rhs, width })),
                _ => None,
            })
            .collect();
        Self {
            config,
            summary,
            conditions,
        }
    }

    /// Interval of an operand: the variable's interval or a singleton.
    pub fn eval_operand(state: &AbstractState, operand: Operand) -> Interval {
        match operand {
            Operand::Var(var) => state.get(var),
            Operand::Const(c) => Interval::constant(c),
        }
    }

    /// Bind the phi nodes at the start of `block`.
    ///
    /// Each phi reads its incoming operand in the state of the edge from the
    /// corresponding predecessor; all phis are evaluated before any is bound.
    pub fn apply_phis(&self, block: &BasicBlock, edges: &[(BlockId, &AbstractState)], state: &mut AbstractState) {
        let mut bindings = Vec::new();
        for inst in block.instructions.iter().take_while(|inst| inst.is_phi()) {
            let (InstKind::Phi { incoming }, Some(dest)) = (&inst.kind, inst.dest) else {
                continue;
            };
            let value = edges
                .iter()
                .filter(|(_, edge)| edge.is_reachable())
                .filter_map(|&(pred, edge)| {
                    let operand = incoming.iter().find(|&&(b, _)| b == pred)?.1;
                    Some(Self::eval_operand(edge, operand))
                })
                .fold(Interval::Bottom, |acc, v| acc.join(&v));
            bindings.push((dest, value));
        }
        for (dest, value) in bindings {
            state.set(dest, value);
        }
    }

    /// Run the non-phi instructions of a block over `state`.
    ///
    /// Risks found along the way are appended to `risks`. Stops as soon as
    /// the state becomes unreachable.
    pub fn apply_block(&self, id: BlockId, block: &BasicBlock, state: &mut AbstractState, risks: &mut Vec<Risk>) {
        for (index, inst) in block.instructions.iter().enumerate() {
            if !state.is_reachable() {
                break;
            }
            if inst.is_phi() {
                continue;
            }
            self.apply(InstLoc::new(id, index), inst, state, risks);
        }
    }

    /// Abstract semantics of a single instruction.
    pub fn apply(&self, loc: InstLoc, inst: &Instruction, state: &mut AbstractState, risks: &mut Vec<Risk>) {
        let width = inst.width;
        let value = match &inst.kind {
            InstKind::Binary { op, lhs, rhs, overflow } => {
                let a = Self::eval_operand(state, *lhs);
                let b = Self::eval_operand(state, *rhs);
                let policy = self.config.division;
                let outcome = match op {
                    BinaryOp::Add => a.add(&b, width, *overflow),
                    BinaryOp::Sub => a.sub(&b, width, *overflow),
                    BinaryOp::Mul => a.mul(&b, width, *overflow),
                    BinaryOp::SDiv => a.sdiv(&b, width, *overflow, policy),
                    BinaryOp::UDiv => a.udiv(&b, width, policy),
                    BinaryOp::SRem => a.srem(&b, width, policy),
                    BinaryOp::URem => a.urem(&b, width, policy),
                    BinaryOp::Shl => a.shl(&b, width, *overflow),
                    BinaryOp::LShr => Outcome::exact(a.lshr(&b, width)),
                    BinaryOp::AShr => Outcome::exact(a.ashr(&b, width)),
                    BinaryOp::And => Outcome::exact(a.and(&b, width)),
                    BinaryOp::Or => Outcome::exact(a.or(&b, width)),
                    BinaryOp::Xor => Outcome::exact(a.xor(&b, width)),
                };
                if outcome.div_by_zero && self.config.report_division_by_zero {
                    self.report(risks, Risk::new(loc, RiskKind::DivisionByZero, b));
                }
                if outcome.overflow && self.config.report_overflow {
                    self.report(risks, Risk::new(loc, RiskKind::SignedOverflow, outcome.value));
                }
                if outcome.value.is_bottom() && !a.is_bottom() && !b.is_bottom() {
                    // Every execution faults.
                    state.mark_unreachable();
                    return;
                }
                outcome.value
            }
            InstKind::Cmp { pred, lhs, rhs, width } => {
                let a = Self::eval_operand(state, *lhs);
                let b = Self::eval_operand(state, *rhs);
                a.compare(*pred, &b, *width)
            }
            InstKind::Cast { op, value, from } => {
                let v = Self::eval_operand(state, *value);
                match op {
                    CastOp::SExt => v.sext(*from, width),
                    CastOp::ZExt => v.zext(*from, width),
                    CastOp::Trunc => v.trunc(*from, width),
                }
            }
            InstKind::Select {
                cond,
                if_true,
                if_false,
            } => {
                let c = Self::eval_operand(state, *cond);
                let mut result = Interval::Bottom;
                if c.contains(1) {
                    result = result.join(&Self::eval_operand(state, *if_true));
                }
                if c.contains(0) {
                    result = result.join(&Self::eval_operand(state, *if_false));
                }
                result
            }
            // Bound at block entry from the predecessor edges.
            InstKind::Phi { .. } => return,
            InstKind::Copy { value } => Self::eval_operand(state, *value),
            InstKind::Load => Interval::Top,
            InstKind::Call { callee, args } => {
                let args: Vec<Interval> = args.iter().map(|&a| Self::eval_operand(state, a)).collect();
                self.summary.summarize(callee, &args, width).unwrap_or(Interval::Top)
            }
            InstKind::Index { index, len } => match self.apply_index(loc, *index, *len, width, state, risks) {
                Some(checked) => checked,
                None => return,
            },
            InstKind::Opaque { opcode, .. } => {
                log::trace!("{}: unsupported opcode {}, result is top", loc, opcode);
                Interval::Top
            }
        };
        if let Some(dest) = inst.dest {
            state.set(dest, value);
        }
    }

    /// Bounds check `0 <= index < len`. Returns the index as refined on the
    /// continuing path, or `None` if the access always faults.
    fn apply_index(
        &self,
        loc: InstLoc,
        index: Operand,
        len: Operand,
        width: IntWidth,
        state: &mut AbstractState,
        risks: &mut Vec<Risk>,
    ) -> Option<Interval> {
        let i = Self::eval_operand(state, index);
        let l = Self::eval_operand(state, len);
        let (Some((lo, hi)), Some((len_lo, _))) = (i.range(width), l.range(width)) else {
            return Some(Interval::Bottom);
        };
        if (lo < 0 || hi >= len_lo) && self.config.report_out_of_bounds {
            self.report(risks, Risk::new(loc, RiskKind::OutOfBounds, i));
        }
        let checked = i
            .refine(Predicate::Sge, &Interval::constant(0), width)
            .refine(Predicate::Slt, &l, width);
        if checked.is_bottom() {
            state.mark_unreachable();
            return None;
        }
        if let Operand::Var(var) = index {
            state.set(var, checked);
        }
        Some(checked)
    }

    fn report(&self, risks: &mut Vec<Risk>, risk: Risk) {
        log::debug!("{}", risk);
        risks.push(risk);
    }

    /// Refined states flowing out of a block along each distinct successor
    /// edge, given the state at the end of its instructions.
    ///
    /// Infeasible edges carry the unreachable state.
    pub fn edge_states(&self, block: &BasicBlock, exit: &AbstractState) -> Vec<(BlockId, AbstractState)> {
        let Some(terminator) = &block.terminator else {
            return Vec::new();
        };
        let mut edges: Vec<(BlockId, AbstractState)> = Vec::new();
        let mut add = |target: BlockId, state: AbstractState| match edges.iter_mut().find(|(b, _)| *b == target) {
            Some((_, existing)) => *existing = existing.join(&state),
            None => edges.push((target, state)),
        };

        match terminator {
            Terminator::Jump(target) => add(*target, exit.clone()),
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => {
                add(*then_block, self.assume_condition(exit, *cond, true));
                add(*else_block, self.assume_condition(exit, *cond, false));
            }
            Terminator::Switch {
                value,
                width,
                cases,
                default,
            } => {
                let scrutinee = Self::eval_operand(exit, *value);
                let mut rest = scrutinee;
                for &(c, target) in cases {
                    let mut state = exit.clone();
                    if !scrutinee.contains(c) {
                        state.mark_unreachable();
                    } else if let Operand::Var(var) = value {
                        state.set(*var, Interval::constant(c));
                    }
                    add(target, state);
                    rest = rest.remove(c, *width);
                }
                let mut state = exit.clone();
                if rest.is_bottom() {
                    state.mark_unreachable();
                } else if let Operand::Var(var) = value {
                    state.set(*var, rest);
                }
                add(*default, state);
            }
            Terminator::Return(_) | Terminator::Unreachable => {}
        }
        edges
    }

    /// State on the edge where the 1-bit `cond` equals `outcome`.
    ///
    /// If `cond` is defined by a comparison, both compared operands are
    /// refined: the left one with the (possibly inverted) predicate, the
    /// right one with the swapped predicate.
    fn assume_condition(&self, exit: &AbstractState, cond: Operand, outcome: bool) -> AbstractState {
        let mut state = exit.clone();
        let bit = outcome as i64;
        if !Self::eval_operand(exit, cond).contains(bit) {
            state.mark_unreachable();
            return state;
        }
        let Operand::Var(var) = cond else {
            return state;
        };
        state.set(var, Interval::constant(bit));

        if let Some(c) = self.conditions.get(&var) {
            let pred = if outcome { c.pred } else { c.pred.inverse() };
            let lhs = Self::eval_operand(&state, c.lhs);
            let rhs = Self::eval_operand(&state, c.rhs);
            let new_lhs = lhs.refine(pred, &rhs, c.width);
            let new_rhs = rhs.refine(pred.swapped(), &lhs, c.width);
            if new_lhs.is_bottom() || new_rhs.is_bottom() {
                state.mark_unreachable();
                return state;
            }
            if let Operand::Var(v) = c.lhs {
                state.set(v, new_lhs);
            }
            if let Operand::Var(v) = c.rhs {
                if c.lhs != c.rhs {
                    state.set(v, new_rhs);
                }
            }
        }
        state
    }
}
