//! Fixpoint engine benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench fixpoint
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use vsa_rs::config::{AnalysisConfig, DivisionPolicy};
use vsa_rs::domain::AbstractDomain;
use vsa_rs::fixpoint::FixpointEngine;
use vsa_rs::interval::Interval;
use vsa_rs::ir::{BinaryOp, Function, FunctionBuilder, Module, Overflow, Predicate};
use vsa_rs::module::analyze_module;
use vsa_rs::types::{BlockId, IntWidth};

const W: IntWidth = IntWidth::I32;

// ============================================================================
// Helper: program generators
// ============================================================================

/// `count` counting loops one after another, each bounded by the previous
/// loop's final counter.
fn loop_chain(count: usize) -> Function {
    let mut b = FunctionBuilder::new(format!("chain_{}", count));
    let n = b.param(W, Some((0, 1000)));
    let mut bound = n;
    let mut pred = BlockId::ENTRY;
    for _ in 0..count {
        let header = b.new_block();
        let body = b.new_block();
        let exit = b.new_block();
        b.switch_to(pred);
        b.jump(header);

        b.switch_to(header);
        let i = b.phi(W);
        let c = b.cmp(Predicate::Slt, i, bound, W);
        b.branch(c, body, exit);

        b.switch_to(body);
        let next = b.binary(BinaryOp::Add, i, 1, W);
        b.jump(header);

        b.add_incoming(i, pred, 0);
        b.add_incoming(i, body, next);
        bound = i;
        pred = exit;
    }
    b.switch_to(pred);
    b.ret(Some(bound.into()));
    b.finish().unwrap()
}

/// `depth` perfectly nested counting loops, the innermost one summing its
/// counters.
fn loop_nest(depth: usize) -> Function {
    let mut b = FunctionBuilder::new(format!("nest_{}", depth));
    let n = b.param(W, Some((0, 100)));

    // Headers and latches, outermost first.
    let mut headers = Vec::new();
    let mut counters = Vec::new();
    let mut pred = BlockId::ENTRY;
    for _ in 0..depth {
        let header = b.new_block();
        b.switch_to(pred);
        b.jump(header);
        b.switch_to(header);
        let i = b.phi(W);
        b.add_incoming(i, pred, 0);
        headers.push(header);
        counters.push(i);
        pred = header;
    }

    let body = b.new_block();
    let exit = b.new_block();
    // Each header enters the next level or leaves to its parent's latch.
    let latches: Vec<BlockId> = (0..depth).map(|_| b.new_block()).collect();
    for level in 0..depth {
        b.switch_to(headers[level]);
        let c = b.cmp(Predicate::Slt, counters[level], n, W);
        let inner = headers.get(level + 1).copied().unwrap_or(body);
        let out = if level == 0 { exit } else { latches[level - 1] };
        b.branch(c, inner, out);
    }

    b.switch_to(body);
    let sum = counters
        .iter()
        .skip(1)
        .fold(counters[0], |acc, &i| b.binary_wrapping(BinaryOp::Add, acc, i, W));
    b.copy(sum, W);
    b.jump(latches[depth - 1]);

    for level in (0..depth).rev() {
        b.switch_to(latches[level]);
        let next = b.binary(BinaryOp::Add, counters[level], 1, W);
        b.jump(headers[level]);
        b.add_incoming(counters[level], latches[level], next);
    }

    b.switch_to(exit);
    b.ret(Some(counters[0].into()));
    b.finish().unwrap()
}

/// Straight-line code of `len` random arithmetic instructions.
fn random_straight_line(len: usize, seed: u64) -> Function {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ops = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::SDiv, BinaryOp::And];
    let mut b = FunctionBuilder::new(format!("random_{}", seed));
    let mut vars = vec![b.param(W, Some((-100, 100))), b.param(W, Some((1, 10)))];
    for _ in 0..len {
        let op = *ops.choose(&mut rng).unwrap();
        let lhs = *vars.choose(&mut rng).unwrap();
        let rhs = *vars.choose(&mut rng).unwrap();
        vars.push(b.binary_wrapping(op, lhs, rhs, W));
    }
    b.ret(Some((*vars.last().unwrap()).into()));
    b.finish().unwrap()
}

// ============================================================================
// Benchmark: loops in sequence
// ============================================================================

fn bench_loop_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixpoint/loop_chain");
    let config = AnalysisConfig::default();

    for count in [1, 4, 16, 64] {
        let function = loop_chain(count);
        group.bench_with_input(BenchmarkId::new("loops", count), &function, |b, function| {
            let engine = FixpointEngine::new(&config);
            b.iter(|| engine.analyze(function).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: loop nesting depth
// ============================================================================

fn bench_loop_nest(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixpoint/loop_nest");
    group.sample_size(20);
    let config = AnalysisConfig::default();

    for depth in [1, 2, 4, 8] {
        let function = loop_nest(depth);
        group.bench_with_input(BenchmarkId::new("depth", depth), &function, |b, function| {
            let engine = FixpointEngine::new(&config);
            b.iter(|| engine.analyze(function).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: widening delay vs narrowing
// ============================================================================

fn bench_widening_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixpoint/widening_delay");
    let function = loop_nest(4);

    for delay in [0, 2, 8] {
        for narrowing in [Some(0), None] {
            let config = AnalysisConfig {
                widening_delay: delay,
                narrowing_passes: narrowing,
                ..AnalysisConfig::default()
            };
            let id = format!("delay_{}_narrow_{}", delay, narrowing.is_none());
            group.bench_function(id, |b| {
                let engine = FixpointEngine::new(&config);
                b.iter(|| engine.analyze(&function).unwrap());
            });
        }
    }

    group.finish();
}

// ============================================================================
// Benchmark: parallel module analysis
// ============================================================================

fn bench_module(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixpoint/module");
    group.sample_size(10);
    let config = AnalysisConfig::default();

    for size in [8, 64, 256] {
        let module: Module = (0..size as u64).map(|seed| random_straight_line(200, seed)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("functions", size), &module, |b, module| {
            let engine = FixpointEngine::new(&config);
            b.iter(|| analyze_module(&engine, module));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: interval arithmetic
// ============================================================================

fn bench_interval_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("interval/arithmetic");
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let intervals: Vec<Interval> = (0..1000)
        .map(|_| {
            let lo = rng.gen_range(-1_000_000..1_000_000);
            Interval::from_bounds(lo, lo + rng.gen_range(0..1000))
        })
        .collect();
    group.throughput(Throughput::Elements(intervals.len() as u64));

    group.bench_function("mul", |b| {
        b.iter(|| {
            intervals
                .windows(2)
                .map(|w| w[0].mul(&w[1], W, Overflow::NoWrap).value)
                .filter(|v| v.is_top())
                .count()
        });
    });
    group.bench_function("sdiv", |b| {
        b.iter(|| {
            intervals
                .windows(2)
                .map(|w| w[0].sdiv(&w[1], W, Overflow::NoWrap, DivisionPolicy::Split).value)
                .filter(|v| v.is_top())
                .count()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_loop_chain,
    bench_loop_nest,
    bench_widening_delay,
    bench_module,
    bench_interval_ops,
);
criterion_main!(benches);
