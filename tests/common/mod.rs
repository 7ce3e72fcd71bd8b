//! Shared helpers for the integration tests: a concrete interpreter of the
//! IR and a few sample programs.

#![allow(dead_code)]

use std::collections::HashMap;

use rand::Rng;

use vsa_rs::fixpoint::FunctionAnalysis;
use vsa_rs::ir::{BinaryOp, CastOp, Function, FunctionBuilder, InstKind, Operand, Overflow, Predicate, Terminator};
use vsa_rs::risk::RiskKind;
use vsa_rs::types::{BlockId, InstLoc, IntWidth, VarId};

pub type Env = HashMap<VarId, i64>;

/// How a concrete execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Return(Option<i64>),
    Fault(InstLoc, RiskKind),
    /// Reached an `unreachable` terminator.
    Trap,
    OutOfFuel,
}

/// Variables at the boundaries of one completed block.
#[derive(Debug, Clone)]
pub struct Visit {
    pub block: BlockId,
    pub entry: Env,
    pub exit: Env,
}

#[derive(Debug, Clone)]
pub struct Trace {
    pub visits: Vec<Visit>,
    pub exit: Exit,
}

/// Reduce to the `width`-bit representation used by the analysis: signed,
/// except for 1-bit values which are `0` or `1`.
pub fn normalize(value: i128, width: IntWidth) -> i64 {
    let m = value.rem_euclid(width.modulus());
    if width.is_bool() || m <= width.max_value() as i128 {
        m as i64
    } else {
        (m - width.modulus()) as i64
    }
}

fn unsigned(value: i64, width: IntWidth) -> u64 {
    value as u64 & width.umax()
}

fn checked(value: i128, width: IntWidth, overflow: Overflow) -> Result<i64, RiskKind> {
    match overflow {
        Overflow::Wrap => Ok(normalize(value, width)),
        Overflow::NoWrap if value < width.min_value() as i128 || value > width.max_value() as i128 => {
            Err(RiskKind::SignedOverflow)
        }
        Overflow::NoWrap => Ok(value as i64),
    }
}

fn binary(op: BinaryOp, a: i64, b: i64, width: IntWidth, overflow: Overflow) -> Result<i64, RiskKind> {
    let (x, y) = (a as i128, b as i128);
    let shift_ok = (0..width.bits() as i64).contains(&b);
    match op {
        BinaryOp::Add => checked(x + y, width, overflow),
        BinaryOp::Sub => checked(x - y, width, overflow),
        BinaryOp::Mul => checked(x * y, width, overflow),
        BinaryOp::SDiv if b == 0 => Err(RiskKind::DivisionByZero),
        BinaryOp::SDiv => checked(x / y, width, overflow),
        BinaryOp::SRem if b == 0 => Err(RiskKind::DivisionByZero),
        BinaryOp::SRem => Ok(normalize(x % y, width)),
        BinaryOp::UDiv | BinaryOp::URem if b == 0 => Err(RiskKind::DivisionByZero),
        BinaryOp::UDiv => Ok(normalize((unsigned(a, width) / unsigned(b, width)) as i128, width)),
        BinaryOp::URem => Ok(normalize((unsigned(a, width) % unsigned(b, width)) as i128, width)),
        BinaryOp::Shl if !shift_ok => Ok(0),
        BinaryOp::Shl => checked(x << b, width, overflow),
        BinaryOp::LShr if !shift_ok => Ok(0),
        BinaryOp::LShr => Ok(normalize((unsigned(a, width) >> b) as i128, width)),
        BinaryOp::AShr if !shift_ok => Ok(0),
        BinaryOp::AShr => Ok(a >> b),
        BinaryOp::And => Ok(normalize((a & b) as i128, width)),
        BinaryOp::Or => Ok(normalize((a | b) as i128, width)),
        BinaryOp::Xor => Ok(normalize((a ^ b) as i128, width)),
    }
}

/// Run `function` on concrete arguments.
///
/// Loads, calls and unknown operations draw their result from `rng`.
pub fn execute<R: Rng>(function: &Function, args: &[i64], rng: &mut R, mut fuel: usize) -> Trace {
    let mut env = Env::new();
    for (param, &arg) in function.params.iter().zip(args) {
        env.insert(param.var, arg);
    }
    let random = |rng: &mut R, width: IntWidth| rng.gen_range(width.min_value()..=width.max_value());
    let value = |env: &Env, op: Operand| match op {
        Operand::Var(v) => env[&v],
        Operand::Const(c) => c,
    };

    let mut visits = Vec::new();
    let mut block = BlockId::ENTRY;
    let mut pred: Option<BlockId> = None;

    loop {
        if fuel == 0 {
            return Trace {
                visits,
                exit: Exit::OutOfFuel,
            };
        }
        fuel -= 1;

        let bb = function.block(block);
        let phis: Vec<(VarId, i64)> = bb
            .instructions
            .iter()
            .take_while(|inst| inst.is_phi())
            .filter_map(|inst| match (&inst.kind, inst.dest, pred) {
                (InstKind::Phi { incoming }, Some(dest), Some(pred)) => {
                    let op = incoming.iter().find(|(b, _)| *b == pred)?.1;
                    Some((dest, value(&env, op)))
                }
                _ => None,
            })
            .collect();
        env.extend(phis);
        let entry = env.clone();

        for (index, inst) in bb.instructions.iter().enumerate() {
            let loc = InstLoc::new(block, index);
            let w = inst.width;
            let result = match &inst.kind {
                InstKind::Phi { .. } => continue,
                InstKind::Binary { op, lhs, rhs, overflow } => {
                    binary(*op, value(&env, *lhs), value(&env, *rhs), w, *overflow)
                }
                InstKind::Cmp { pred, lhs, rhs, width } => {
                    Ok(pred.evaluate(value(&env, *lhs), value(&env, *rhs), *width) as i64)
                }
                InstKind::Cast { op, value: v, from } => {
                    let v = value(&env, *v);
                    Ok(match op {
                        CastOp::SExt => v,
                        CastOp::ZExt => unsigned(v, *from) as i64,
                        CastOp::Trunc => normalize(v as i128, w),
                    })
                }
                InstKind::Select {
                    cond,
                    if_true,
                    if_false,
                } => Ok(if value(&env, *cond) != 0 {
                    value(&env, *if_true)
                } else {
                    value(&env, *if_false)
                }),
                InstKind::Copy { value: v } => Ok(value(&env, *v)),
                InstKind::Load | InstKind::Call { .. } | InstKind::Opaque { .. } => Ok(random(rng, w)),
                InstKind::Index { index, len } => {
                    let i = value(&env, *index);
                    if 0 <= i && i < value(&env, *len) {
                        Ok(i)
                    } else {
                        Err(RiskKind::OutOfBounds)
                    }
                }
            };
            match result {
                Ok(v) => {
                    if let Some(dest) = inst.dest {
                        env.insert(dest, v);
                    }
                }
                Err(kind) => {
                    return Trace {
                        visits,
                        exit: Exit::Fault(loc, kind),
                    }
                }
            }
        }

        visits.push(Visit {
            block,
            entry,
            exit: env.clone(),
        });

        let next = match bb.terminator.as_ref() {
            Some(Terminator::Jump(target)) => *target,
            Some(Terminator::Branch {
                cond,
                then_block,
                else_block,
            }) => {
                if value(&env, *cond) != 0 {
                    *then_block
                } else {
                    *else_block
                }
            }
            Some(Terminator::Switch {
                value: v, cases, default, ..
            }) => {
                let v = value(&env, *v);
                cases.iter().find(|(c, _)| *c == v).map_or(*default, |&(_, target)| target)
            }
            Some(Terminator::Return(v)) => {
                return Trace {
                    visits,
                    exit: Exit::Return(v.map(|v| value(&env, v))),
                }
            }
            Some(Terminator::Unreachable) | None => return Trace { visits, exit: Exit::Trap },
        };
        pred = Some(block);
        block = next;
    }
}

/// Check that a concrete trace is covered by the analysis result.
pub fn check_covered(function: &Function, result: &FunctionAnalysis, trace: &Trace) {
    for visit in &trace.visits {
        assert!(
            result.is_reachable(visit.block),
            "{}: {} executed but deemed unreachable",
            function.name,
            visit.block
        );
        for (var, &v) in &visit.entry {
            let interval = result.entry(visit.block).get(*var);
            assert!(
                interval.contains(v),
                "{}: {} = {} at entry of {} not in {}",
                function.name,
                var,
                v,
                visit.block,
                interval
            );
        }
        for (var, &v) in &visit.exit {
            let interval = result.exit(visit.block).get(*var);
            assert!(
                interval.contains(v),
                "{}: {} = {} at exit of {} not in {}",
                function.name,
                var,
                v,
                visit.block,
                interval
            );
        }
    }
    match &trace.exit {
        Exit::Return(Some(v)) => assert!(
            result.return_range.contains(*v),
            "{}: returned {} not in {}",
            function.name,
            v,
            result.return_range
        ),
        Exit::Fault(loc, kind) => assert!(
            result.risks.iter().any(|r| r.loc == *loc && r.kind == *kind),
            "{}: {} at {} not reported",
            function.name,
            kind,
            loc
        ),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Sample programs
// ---------------------------------------------------------------------------

pub const W: IntWidth = IntWidth::I32;

/// `x = 5; y = x + 3; return y`
pub fn straight_line() -> (Function, VarId, VarId) {
    let mut b = FunctionBuilder::new("straight_line");
    let x = b.copy(5, W);
    let y = b.binary(BinaryOp::Add, x, 3, W);
    b.ret(Some(y.into()));
    (b.finish().unwrap(), x, y)
}

/// `if (x < 10) { y = x } else { y = 100 }; return y`
///
/// Blocks: bb0 test, bb1 then, bb2 else, bb3 join. Returns the function,
/// `x` and the phi for `y`.
pub fn conditional(range: Option<(i64, i64)>) -> (Function, VarId, VarId) {
    let mut b = FunctionBuilder::new("conditional");
    let x = b.param(W, range);
    let then_block = b.new_block();
    let else_block = b.new_block();
    let join = b.new_block();
    let c = b.cmp(Predicate::Slt, x, 10, W);
    b.branch(c, then_block, else_block);

    b.switch_to(then_block);
    let y1 = b.copy(x, W);
    b.jump(join);

    b.switch_to(else_block);
    let y2 = b.copy(100, W);
    b.jump(join);

    b.switch_to(join);
    let y = b.phi(W);
    b.add_incoming(y, then_block, y1);
    b.add_incoming(y, else_block, y2);
    b.ret(Some(y.into()));
    (b.finish().unwrap(), x, y)
}

/// `for (i = start; i < n; i += step) { sum += i }; return sum`
///
/// Blocks: bb0 init, bb1 header, bb2 body, bb3 exit. Returns the function
/// and the phi for `i`.
pub fn counting_loop(start: i64, n: i64, step: i64) -> (Function, VarId) {
    let mut b = FunctionBuilder::new("counting_loop");
    let header = b.new_block();
    let body = b.new_block();
    let exit = b.new_block();
    b.jump(header);

    b.switch_to(header);
    let i = b.phi(W);
    let sum = b.phi(W);
    let c = b.cmp(Predicate::Slt, i, n, W);
    b.branch(c, body, exit);

    b.switch_to(body);
    let sum2 = b.binary_wrapping(BinaryOp::Add, sum, i, W);
    let next = b.binary(BinaryOp::Add, i, step, W);
    b.jump(header);

    b.switch_to(exit);
    b.ret(Some(sum.into()));

    b.add_incoming(i, BlockId::ENTRY, start);
    b.add_incoming(i, body, next);
    b.add_incoming(sum, BlockId::ENTRY, 0);
    b.add_incoming(sum, body, sum2);
    (b.finish().unwrap(), i)
}

/// Nested loops: `for i in 0..n { for j in 0..i { a[j] } }` with `a` of
/// length `len`.
pub fn nested_loops(len: i64) -> Function {
    let mut b = FunctionBuilder::new("nested_loops");
    let n = b.param(W, Some((0, 50)));
    let outer = b.new_block();
    let inner = b.new_block();
    let inner_body = b.new_block();
    let outer_latch = b.new_block();
    let exit = b.new_block();
    b.jump(outer);

    b.switch_to(outer);
    let i = b.phi(W);
    let c1 = b.cmp(Predicate::Slt, i, n, W);
    b.branch(c1, inner, exit);

    b.switch_to(inner);
    let j = b.phi(W);
    let c2 = b.cmp(Predicate::Slt, j, i, W);
    b.branch(c2, inner_body, outer_latch);

    b.switch_to(inner_body);
    b.index(j, len, W);
    let j2 = b.binary(BinaryOp::Add, j, 1, W);
    b.jump(inner);

    b.switch_to(outer_latch);
    let i2 = b.binary(BinaryOp::Add, i, 1, W);
    b.jump(outer);

    b.switch_to(exit);
    b.ret(Some(i.into()));

    b.add_incoming(i, BlockId::ENTRY, 0);
    b.add_incoming(i, outer_latch, i2);
    b.add_incoming(j, outer, 0);
    b.add_incoming(j, inner_body, j2);
    b.finish().unwrap()
}
