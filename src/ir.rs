//! SSA control-flow graph consumed by the analysis.
//!
//! A [`Function`] is an indexed table of [`BasicBlock`]s. Blocks refer to each
//! other by [`BlockId`] only, so loops do not create ownership cycles. Every
//! variable is defined exactly once, either as a [`Param`] or by an
//! [`Instruction`].
//!
//! ## Example
//!
//! ```rust
//! use vsa_rs::ir::{BinaryOp, FunctionBuilder, Predicate};
//! use vsa_rs::types::IntWidth;
//!
//! let mut b = FunctionBuilder::new("clamp");
//! let x = b.param(IntWidth::I32, None);
//! let small = b.new_block();
//! let large = b.new_block();
//!
//! let cond = b.cmp(Predicate::Slt, x, 10, IntWidth::I32);
//! b.branch(cond, small, large);
//!
//! b.switch_to(small);
//! let y = b.binary(BinaryOp::Add, x, 1, IntWidth::I32);
//! b.ret(Some(y.into()));
//!
//! b.switch_to(large);
//! b.ret(Some(10.into()));
//!
//! let function = b.finish().unwrap();
//! assert_eq!(function.num_blocks(), 3);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::types::{BlockId, InstLoc, IntWidth, VarId};

/// Instruction operand: a variable or an integer constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Var(VarId),
    Const(i64),
}

impl Operand {
    pub fn as_var(self) -> Option<VarId> {
        match self {
            Operand::Var(v) => Some(v),
            Operand::Const(_) => None,
        }
    }
}

impl From<VarId> for Operand {
    fn from(var: VarId) -> Self {
        Operand::Var(var)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Const(value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(v) => write!(f, "{}", v),
            Operand::Const(c) => write!(f, "{}", c),
        }
    }
}

/// Declared overflow behaviour of an arithmetic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Overflow {
    /// Two's-complement wraparound is the intended semantics.
    Wrap,
    /// Signed overflow is a fault.
    #[default]
    NoWrap,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    /// Division and remainder, which fault on a zero divisor.
    pub fn is_division(self) -> bool {
        matches!(self, BinaryOp::SDiv | BinaryOp::UDiv | BinaryOp::SRem | BinaryOp::URem)
    }

    /// Operators whose [`Overflow`] flag is meaningful.
    pub fn may_overflow(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::SDiv | BinaryOp::Shl)
    }

    fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::UDiv => "udiv",
            BinaryOp::SRem => "srem",
            BinaryOp::URem => "urem",
            BinaryOp::Shl => "shl",
            BinaryOp::LShr => "lshr",
            BinaryOp::AShr => "ashr",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

/// Integer width conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    SExt,
    ZExt,
    Trunc,
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastOp::SExt => f.pad("sext"),
            CastOp::ZExt => f.pad("zext"),
            CastOp::Trunc => f.pad("trunc"),
        }
    }
}

/// Comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl Predicate {
    /// Returns the negation of this predicate: `!(a p b) == a p.inverse() b`.
    pub fn inverse(self) -> Self {
        match self {
            Predicate::Eq => Predicate::Ne,
            Predicate::Ne => Predicate::Eq,
            Predicate::Slt => Predicate::Sge,
            Predicate::Sle => Predicate::Sgt,
            Predicate::Sgt => Predicate::Sle,
            Predicate::Sge => Predicate::Slt,
            Predicate::Ult => Predicate::Uge,
            Predicate::Ule => Predicate::Ugt,
            Predicate::Ugt => Predicate::Ule,
            Predicate::Uge => Predicate::Ult,
        }
    }

    /// Returns the predicate with operands exchanged: `a p b == b p.swapped() a`.
    pub fn swapped(self) -> Self {
        match self {
            Predicate::Eq => Predicate::Eq,
            Predicate::Ne => Predicate::Ne,
            Predicate::Slt => Predicate::Sgt,
            Predicate::Sle => Predicate::Sge,
            Predicate::Sgt => Predicate::Slt,
            Predicate::Sge => Predicate::Sle,
            Predicate::Ult => Predicate::Ugt,
            Predicate::Ule => Predicate::Uge,
            Predicate::Ugt => Predicate::Ult,
            Predicate::Uge => Predicate::Ule,
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, Predicate::Ult | Predicate::Ule | Predicate::Ugt | Predicate::Uge)
    }

    /// Concrete evaluation on two `width`-bit values.
    pub fn evaluate(self, a: i64, b: i64, width: IntWidth) -> bool {
        let (ua, ub) = (a as u64 & width.umax(), b as u64 & width.umax());
        match self {
            Predicate::Eq => a == b,
            Predicate::Ne => a != b,
            Predicate::Slt => a < b,
            Predicate::Sle => a <= b,
            Predicate::Sgt => a > b,
            Predicate::Sge => a >= b,
            Predicate::Ult => ua < ub,
            Predicate::Ule => ua <= ub,
            Predicate::Ugt => ua > ub,
            Predicate::Uge => ua >= ub,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Predicate::Eq => "eq",
            Predicate::Ne => "ne",
            Predicate::Slt => "slt",
            Predicate::Sle => "sle",
            Predicate::Sgt => "sgt",
            Predicate::Sge => "sge",
            Predicate::Ult => "ult",
            Predicate::Ule => "ule",
            Predicate::Ugt => "ugt",
            Predicate::Uge => "uge",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

/// What an instruction computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstKind {
    /// `dest = lhs op rhs`, operands of the instruction's width.
    Binary {
        op: BinaryOp,
        lhs: Operand,
        rhs: Operand,
        overflow: Overflow,
    },
    /// `dest = lhs pred rhs` on `width`-bit operands; `dest` is 1-bit.
    Cmp {
        pred: Predicate,
        lhs: Operand,
        rhs: Operand,
        width: IntWidth,
    },
    /// `dest = op value` from `from` bits to the instruction's width.
    Cast { op: CastOp, value: Operand, from: IntWidth },
    /// `dest = cond ? if_true : if_false`.
    Select {
        cond: Operand,
        if_true: Operand,
        if_false: Operand,
    },
    /// `dest` takes the value flowing in from the predecessor block.
    Phi { incoming: Vec<(BlockId, Operand)> },
    /// `dest = value`.
    Copy { value: Operand },
    /// Read from memory, which is not modelled.
    Load,
    /// Call to another function.
    Call { callee: String, args: Vec<Operand> },
    /// Bounds-checked access `base[index]` to an object of `len` elements.
    ///
    /// Faults unless `0 <= index < len`; `dest`, if any, receives the index.
    Index { index: Operand, len: Operand },
    /// Any other operation. Its result, if any, is unconstrained.
    Opaque { opcode: String, args: Vec<Operand> },
}

/// Instruction: an optional defined variable of the given width and an
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub dest: Option<VarId>,
    pub width: IntWidth,
    pub kind: InstKind,
}

impl Instruction {
    /// All operands read by the instruction, in order.
    pub fn operands(&self) -> Vec<Operand> {
        match &self.kind {
            InstKind::Binary { lhs, rhs, .. } | InstKind::Cmp { lhs, rhs, .. } => vec![*lhs, *rhs],
            InstKind::Cast { value, .. } | InstKind::Copy { value } => vec![*value],
            InstKind::Select {
                cond,
                if_true,
                if_false,
            } => vec![*cond, *if_true, *if_false],
            InstKind::Phi { incoming } => incoming.iter().map(|&(_, op)| op).collect(),
            InstKind::Load => Vec::new(),
            InstKind::Call { args, .. } | InstKind::Opaque { args, .. } => args.clone(),
            InstKind::Index { index, len } => vec![*index, *len],
        }
    }

    pub fn is_phi(&self) -> bool {
        matches!(self.kind, InstKind::Phi { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dest) = self.dest {
            write!(f, "{} = ", dest)?;
        }
        let w = self.width;
        match &self.kind {
            InstKind::Binary { op, lhs, rhs, overflow } => {
                let flag = if op.may_overflow() && *overflow == Overflow::NoWrap {
                    " nsw"
                } else {
                    ""
                };
                write!(f, "{}{} {} {}, {}", op, flag, w, lhs, rhs)
            }
            InstKind::Cmp { pred, lhs, rhs, width } => write!(f, "cmp {} {} {}, {}", pred, width, lhs, rhs),
            InstKind::Cast { op, value, from } => write!(f, "{} {} {} to {}", op, from, value, w),
            InstKind::Select {
                cond,
                if_true,
                if_false,
            } => write!(f, "select {} {}, {}, {}", w, cond, if_true, if_false),
            InstKind::Phi { incoming } => {
                write!(f, "phi {}", w)?;
                for (i, (block, value)) in incoming.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}[{}, {}]", sep, value, block)?;
                }
                Ok(())
            }
            InstKind::Copy { value } => write!(f, "copy {} {}", w, value),
            InstKind::Load => write!(f, "load {}", w),
            InstKind::Call { callee, args } => {
                write!(f, "call {} @{}(", w, callee)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            InstKind::Index { index, len } => write!(f, "index {} {}, len {}", w, index, len),
            InstKind::Opaque { opcode, args } => {
                write!(f, "{} {} ", opcode, w)?;
                write_list(f, args)
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Operand]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// How control flow leaves a basic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// Unconditional jump.
    Jump(BlockId),
    /// Conditional branch on a 1-bit value.
    Branch {
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// Multi-way branch on a `width`-bit value.
    Switch {
        value: Operand,
        width: IntWidth,
        cases: Vec<(i64, BlockId)>,
        default: BlockId,
    },
    /// Function return.
    Return(Option<Operand>),
    /// Control never reaches the end of the block.
    Unreachable,
}

impl Terminator {
    /// Distinct successor blocks, in order of first appearance.
    pub fn successors(&self) -> Vec<BlockId> {
        let all: Vec<BlockId> = match self {
            Terminator::Jump(target) => vec![*target],
            Terminator::Branch {
                then_block, else_block, ..
            } => vec![*then_block, *else_block],
            Terminator::Switch { cases, default, .. } => {
                cases.iter().map(|&(_, target)| target).chain(std::iter::once(*default)).collect()
            }
            Terminator::Return(_) | Terminator::Unreachable => Vec::new(),
        };
        let mut result = Vec::with_capacity(all.len());
        for block in all {
            if !result.contains(&block) {
                result.push(block);
            }
        }
        result
    }

    /// Operands read by the terminator.
    pub fn operands(&self) -> Vec<Operand> {
        match self {
            Terminator::Branch { cond, .. } => vec![*cond],
            Terminator::Switch { value, .. } => vec![*value],
            Terminator::Return(Some(value)) => vec![*value],
            Terminator::Jump(_) | Terminator::Return(None) | Terminator::Unreachable => Vec::new(),
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Jump(target) => write!(f, "br {}", target),
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => write!(f, "br {}, {}, {}", cond, then_block, else_block),
            Terminator::Switch {
                value,
                width,
                cases,
                default,
            } => {
                write!(f, "switch {} {}, {} [", width, value, default)?;
                for (i, (c, target)) in cases.iter().enumerate() {
                    let sep = if i == 0 { "" } else { ", " };
                    write!(f, "{}{}: {}", sep, c, target)?;
                }
                write!(f, "]")
            }
            Terminator::Return(Some(value)) => write!(f, "ret {}", value),
            Terminator::Return(None) => write!(f, "ret"),
            Terminator::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// A basic block: straight-line instructions followed by a terminator.
///
/// Phi instructions, if any, come first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicBlock {
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    /// Successors of the block; empty if it has no terminator yet.
    pub fn successors(&self) -> Vec<BlockId> {
        self.terminator.as_ref().map(Terminator::successors).unwrap_or_default()
    }
}

/// Function parameter with an optional declared range.
///
/// A parameter without a range may hold any value of its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub var: VarId,
    pub width: IntWidth,
    pub range: Option<(i64, i64)>,
}

/// A function: parameters and basic blocks, the first block being the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Block by identifier.
    ///
    /// # Panics
    ///
    /// Panics if the block does not exist.
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len()).map(BlockId::new)
    }

    /// Successor lists, indexed by block.
    pub fn successors(&self) -> Vec<Vec<BlockId>> {
        self.blocks.iter().map(BasicBlock::successors).collect()
    }

    /// Predecessor lists, indexed by block, in block order.
    pub fn predecessors(&self) -> Vec<Vec<BlockId>> {
        let mut preds = vec![Vec::new(); self.blocks.len()];
        for (id, block) in self.blocks.iter().enumerate() {
            for succ in block.successors() {
                if let Some(list) = preds.get_mut(succ.index()) {
                    list.push(BlockId::new(id));
                }
            }
        }
        preds
    }

    /// Every defined variable with its width, parameters first.
    pub fn definitions(&self) -> Vec<(VarId, IntWidth)> {
        let params = self.params.iter().map(|p| (p.var, p.width));
        let insts = self
            .blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .filter_map(|inst| inst.dest.map(|dest| (dest, inst.width)));
        params.chain(insts).collect()
    }

    /// Number of defined variables.
    pub fn num_vars(&self) -> usize {
        self.definitions().len()
    }

    /// Check the structural well-formedness of the function.
    ///
    /// Rejects functions without blocks, blocks without terminators,
    /// dangling successors, inconsistent phi nodes, variables defined twice
    /// or never, operands of the wrong width, unrepresentable constants and
    /// parameter ranges, casts in the wrong direction, and non-boolean
    /// branch conditions.
    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(AnalysisError::EmptyFunction);
        }
        for (id, block) in self.blocks.iter().enumerate() {
            let Some(terminator) = &block.terminator else {
                return Err(AnalysisError::MissingTerminator { block: BlockId::new(id) });
            };
            for target in terminator.successors() {
                if target.index() >= self.blocks.len() {
                    return Err(AnalysisError::DanglingSuccessor {
                        block: BlockId::new(id),
                        target,
                    });
                }
            }
        }

        let mut widths = HashMap::new();
        for (var, width) in self.definitions() {
            if widths.insert(var, width).is_some() {
                return Err(AnalysisError::DuplicateDefinition { var });
            }
        }

        for param in &self.params {
            if let Some((lo, hi)) = param.range {
                if lo > hi || !param.width.contains(lo) || !param.width.contains(hi) {
                    return Err(AnalysisError::InvalidParameterRange {
                        var: param.var,
                        lo,
                        hi,
                        width: param.width,
                    });
                }
            }
        }

        let preds = self.predecessors();
        let ret_width = self.return_width(&widths);
        for (id, block) in self.blocks.iter().enumerate() {
            let block_id = BlockId::new(id);
            for (index, inst) in block.instructions.iter().enumerate() {
                let loc = InstLoc::new(block_id, index);
                check_operands(loc, &typed_operands(inst), &widths)?;
                match &inst.kind {
                    InstKind::Phi { incoming } => check_phi(loc, incoming, &preds[id])?,
                    InstKind::Cast { op, from, .. } => {
                        let ok = match op {
                            CastOp::SExt | CastOp::ZExt => inst.width > *from,
                            CastOp::Trunc => inst.width < *from,
                        };
                        if !ok {
                            return Err(AnalysisError::InvalidCast { loc });
                        }
                    }
                    InstKind::Select { cond, .. } => check_condition(block_id, *cond, &widths)?,
                    _ => {}
                }
            }
            let loc = InstLoc::new(block_id, block.instructions.len());
            if let Some(terminator) = &block.terminator {
                match terminator {
                    Terminator::Branch { cond, .. } => check_condition(block_id, *cond, &widths)?,
                    Terminator::Switch { value, width, cases, .. } => {
                        check_operands(loc, &[(*value, Some(*width))], &widths)?;
                        for &(c, _) in cases {
                            if !width.contains(c) {
                                return Err(AnalysisError::ConstantOutOfRange { value: c, width: *width });
                            }
                        }
                    }
                    Terminator::Return(Some(value)) => check_operands(loc, &[(*value, ret_width)], &widths)?,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Width of the first returned variable, which every return must share.
    fn return_width(&self, widths: &HashMap<VarId, IntWidth>) -> Option<IntWidth> {
        self.blocks.iter().find_map(|block| match block.terminator {
            Some(Terminator::Return(Some(Operand::Var(var)))) => widths.get(&var).copied(),
            _ => None,
        })
    }
}

/// Operands of an instruction paired with the width each must have.
///
/// Call and opaque arguments carry no declared width and are only checked
/// for being defined. Select conditions are checked separately.
fn typed_operands(inst: &Instruction) -> Vec<(Operand, Option<IntWidth>)> {
    let width = Some(inst.width);
    match &inst.kind {
        InstKind::Binary { lhs, rhs, .. } => vec![(*lhs, width), (*rhs, width)],
        InstKind::Cmp { lhs, rhs, width, .. } => vec![(*lhs, Some(*width)), (*rhs, Some(*width))],
        InstKind::Cast { value, from, .. } => vec![(*value, Some(*from))],
        InstKind::Copy { value } => vec![(*value, width)],
        InstKind::Select { if_true, if_false, .. } => vec![(*if_true, width), (*if_false, width)],
        InstKind::Phi { incoming } => incoming.iter().map(|&(_, op)| (op, width)).collect(),
        InstKind::Index { index, len } => vec![(*index, width), (*len, width)],
        InstKind::Call { args, .. } | InstKind::Opaque { args, .. } => args.iter().map(|&op| (op, None)).collect(),
        InstKind::Load => Vec::new(),
    }
}

fn check_operands(
    loc: InstLoc,
    operands: &[(Operand, Option<IntWidth>)],
    widths: &HashMap<VarId, IntWidth>,
) -> Result<()> {
    for &(operand, expected) in operands {
        match operand {
            Operand::Var(var) => {
                let Some(&found) = widths.get(&var) else {
                    return Err(AnalysisError::UndefinedVariable { block: loc.block, var });
                };
                if let Some(expected) = expected {
                    if found != expected {
                        return Err(AnalysisError::WidthMismatch {
                            loc,
                            var,
                            expected,
                            found,
                        });
                    }
                }
            }
            Operand::Const(value) => {
                if let Some(width) = expected {
                    if !width.contains(value) {
                        return Err(AnalysisError::ConstantOutOfRange { value, width });
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_condition(block: BlockId, cond: Operand, widths: &HashMap<VarId, IntWidth>) -> Result<()> {
    match cond {
        Operand::Var(var) => match widths.get(&var) {
            None => Err(AnalysisError::UndefinedVariable { block, var }),
            Some(width) if !width.is_bool() => Err(AnalysisError::InvalidBranchCondition { block, var }),
            Some(_) => Ok(()),
        },
        Operand::Const(value) => {
            if IntWidth::I1.contains(value) {
                Ok(())
            } else {
                Err(AnalysisError::ConstantOutOfRange {
                    value,
                    width: IntWidth::I1,
                })
            }
        }
    }
}

fn check_phi(loc: InstLoc, incoming: &[(BlockId, Operand)], preds: &[BlockId]) -> Result<()> {
    for &(pred, _) in incoming {
        if !preds.contains(&pred) {
            return Err(AnalysisError::DanglingPhiSource { loc, pred });
        }
    }
    for &pred in preds {
        if !incoming.iter().any(|&(b, _)| b == pred) {
            return Err(AnalysisError::IncompletePhi { loc, pred });
        }
    }
    Ok(())
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", param.width, param.var)?;
            if let Some((lo, hi)) = param.range {
                write!(f, " in [{}, {}]", lo, hi)?;
            }
        }
        writeln!(f, ") {{")?;
        for (id, block) in self.blocks.iter().enumerate() {
            writeln!(f, "{}:", BlockId::new(id))?;
            for inst in &block.instructions {
                writeln!(f, "    {}", inst)?;
            }
            match &block.terminator {
                Some(terminator) => writeln!(f, "    {}", terminator)?,
                None => writeln!(f, "    <no terminator>")?,
            }
        }
        write!(f, "}}")
    }
}

/// A collection of independent functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, function: Function) {
        self.functions.push(function);
    }

    /// Function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl FromIterator<Function> for Module {
    fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
        Self {
            functions: iter.into_iter().collect(),
        }
    }
}

/// Incremental construction of a [`Function`].
///
/// The builder starts with an entry block selected; instructions are
/// appended to the current block. Variables are numbered sequentially.
#[derive(Debug)]
pub struct FunctionBuilder {
    function: Function,
    current: BlockId,
    next_var: u32,
    phis: BTreeMap<VarId, InstLoc>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut function = Function::new(name);
        function.blocks.push(BasicBlock::default());
        Self {
            function,
            current: BlockId::ENTRY,
            next_var: 0,
            phis: BTreeMap::new(),
        }
    }

    fn fresh_var(&mut self) -> VarId {
        let var = VarId::new(self.next_var);
        self.next_var += 1;
        var
    }

    /// Declare a parameter, optionally constrained to `[lo, hi]`.
    pub fn param(&mut self, width: IntWidth, range: Option<(i64, i64)>) -> VarId {
        let var = self.fresh_var();
        self.function.params.push(Param { var, width, range });
        var
    }

    /// Append a new empty block. The current block is unchanged.
    pub fn new_block(&mut self) -> BlockId {
        self.function.blocks.push(BasicBlock::default());
        BlockId::new(self.function.blocks.len() - 1)
    }

    /// Select the block that subsequent instructions are appended to.
    pub fn switch_to(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    fn block_mut(&mut self) -> &mut BasicBlock {
        &mut self.function.blocks[self.current.index()]
    }

    /// Append an instruction defining a new variable.
    pub fn push(&mut self, width: IntWidth, kind: InstKind) -> VarId {
        let dest = self.fresh_var();
        self.block_mut().instructions.push(Instruction {
            dest: Some(dest),
            width,
            kind,
        });
        dest
    }

    /// Append an instruction without a result.
    pub fn push_void(&mut self, width: IntWidth, kind: InstKind) {
        self.block_mut().instructions.push(Instruction { dest: None, width, kind });
    }

    /// `lhs op rhs` where signed overflow is a fault.
    pub fn binary(&mut self, op: BinaryOp, lhs: impl Into<Operand>, rhs: impl Into<Operand>, width: IntWidth) -> VarId {
        self.binary_with(op, lhs, rhs, width, Overflow::NoWrap)
    }

    /// `lhs op rhs` with wraparound semantics.
    pub fn binary_wrapping(
        &mut self,
        op: BinaryOp,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
        width: IntWidth,
    ) -> VarId {
        self.binary_with(op, lhs, rhs, width, Overflow::Wrap)
    }

    fn binary_with(
        &mut self,
        op: BinaryOp,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
        width: IntWidth,
        overflow: Overflow,
    ) -> VarId {
        let kind = InstKind::Binary {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
            overflow,
        };
        self.push(width, kind)
    }

    /// Compare two `width`-bit operands, defining a 1-bit result.
    pub fn cmp(&mut self, pred: Predicate, lhs: impl Into<Operand>, rhs: impl Into<Operand>, width: IntWidth) -> VarId {
        let kind = InstKind::Cmp {
            pred,
            lhs: lhs.into(),
            rhs: rhs.into(),
            width,
        };
        self.push(IntWidth::I1, kind)
    }

    pub fn cast(&mut self, op: CastOp, value: impl Into<Operand>, from: IntWidth, to: IntWidth) -> VarId {
        let kind = InstKind::Cast {
            op,
            value: value.into(),
            from,
        };
        self.push(to, kind)
    }

    pub fn select(
        &mut self,
        cond: impl Into<Operand>,
        if_true: impl Into<Operand>,
        if_false: impl Into<Operand>,
        width: IntWidth,
    ) -> VarId {
        let kind = InstKind::Select {
            cond: cond.into(),
            if_true: if_true.into(),
            if_false: if_false.into(),
        };
        self.push(width, kind)
    }

    pub fn copy(&mut self, value: impl Into<Operand>, width: IntWidth) -> VarId {
        self.push(width, InstKind::Copy { value: value.into() })
    }

    pub fn load(&mut self, width: IntWidth) -> VarId {
        self.push(width, InstKind::Load)
    }

    pub fn call(&mut self, callee: impl Into<String>, args: Vec<Operand>, width: IntWidth) -> VarId {
        let kind = InstKind::Call {
            callee: callee.into(),
            args,
        };
        self.push(width, kind)
    }

    /// Bounds-checked access; the result is the checked index.
    pub fn index(&mut self, index: impl Into<Operand>, len: impl Into<Operand>, width: IntWidth) -> VarId {
        let kind = InstKind::Index {
            index: index.into(),
            len: len.into(),
        };
        self.push(width, kind)
    }

    /// Phi node with no incoming values yet; add them with [`add_incoming`].
    ///
    /// Phi nodes are kept in front of the block's other instructions.
    ///
    /// [`add_incoming`]: FunctionBuilder::add_incoming
    pub fn phi(&mut self, width: IntWidth) -> VarId {
        let dest = self.fresh_var();
        let block = self.current;
        let instructions = &mut self.block_mut().instructions;
        let index = instructions.iter().take_while(|inst| inst.is_phi()).count();
        instructions.insert(
            index,
            Instruction {
                dest: Some(dest),
                width,
                kind: InstKind::Phi { incoming: Vec::new() },
            },
        );
        self.phis.insert(dest, InstLoc::new(block, index));
        dest
    }

    /// Add the value `phi` takes when control arrives from `pred`.
    ///
    /// # Panics
    ///
    /// Panics if `phi` was not created by [`phi`](FunctionBuilder::phi).
    pub fn add_incoming(&mut self, phi: VarId, pred: BlockId, value: impl Into<Operand>) {
        let loc = self.phis[&phi];
        let inst = &mut self.function.blocks[loc.block.index()].instructions[loc.index];
        if let InstKind::Phi { incoming } = &mut inst.kind {
            incoming.push((pred, value.into()));
        }
    }

    pub fn jump(&mut self, target: BlockId) {
        self.terminate(Terminator::Jump(target));
    }

    pub fn branch(&mut self, cond: impl Into<Operand>, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::Branch {
            cond: cond.into(),
            then_block,
            else_block,
        });
    }

    pub fn switch(&mut self, value: impl Into<Operand>, width: IntWidth, cases: Vec<(i64, BlockId)>, default: BlockId) {
        self.terminate(Terminator::Switch {
            value: value.into(),
            width,
            cases,
            default,
        });
    }

    pub fn ret(&mut self, value: Option<Operand>) {
        self.terminate(Terminator::Return(value));
    }

    pub fn unreachable(&mut self) {
        self.terminate(Terminator::Unreachable);
    }

    pub fn terminate(&mut self, terminator: Terminator) {
        self.block_mut().terminator = Some(terminator);
    }

    /// Validate and return the function.
    pub fn finish(self) -> Result<Function> {
        self.function.validate()?;
        Ok(self.function)
    }

    /// Return the function without validating it.
    pub fn finish_unchecked(self) -> Function {
        self.function
    }
}
