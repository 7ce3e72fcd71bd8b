use clap::{Parser, ValueEnum};

use vsa_rs::config::{AnalysisConfig, DivisionPolicy};
use vsa_rs::fixpoint::FixpointEngine;
use vsa_rs::ir::{BinaryOp, Function, FunctionBuilder, Predicate};
use vsa_rs::types::{BlockId, IntWidth};

const W: IntWidth = IntWidth::I32;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Program {
    /// `for (i = 0; i < bound; i++) sum += i`
    Loop,
    /// `y = x < bound ? x : 100`
    Branch,
    /// `10 / d` with `d` in `[-bound, bound]`
    Division,
    /// Triangular nested loops indexing an array of length `bound`
    Nested,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Program to analyze.
    #[arg(long, value_enum, default_value = "loop")]
    program: Program,

    /// Numeric parameter of the program.
    #[arg(long, value_name = "INT", default_value = "10")]
    bound: i64,

    /// Number of join iterations at loop headers before widening.
    #[arg(long, value_name = "INT", default_value = "2")]
    widening_delay: usize,

    /// Disable the narrowing phase.
    #[arg(long)]
    no_narrowing: bool,

    /// Return `Top` for divisors that may be zero instead of splitting them.
    #[arg(long)]
    division_top: bool,

    /// Print the annotated control-flow graph in DOT format.
    #[arg(long)]
    dot: bool,

    /// Log level.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: simplelog::LevelFilter,
}

fn build(program: Program, bound: i64) -> color_eyre::Result<Function> {
    let mut b = FunctionBuilder::new(format!("{:?}", program).to_lowercase());
    match program {
        Program::Loop => {
            let header = b.new_block();
            let body = b.new_block();
            let exit = b.new_block();
            b.jump(header);
            b.switch_to(header);
            let i = b.phi(W);
            let sum = b.phi(W);
            let c = b.cmp(Predicate::Slt, i, bound, W);
            b.branch(c, body, exit);
            b.switch_to(body);
            let sum2 = b.binary(BinaryOp::Add, sum, i, W);
            let i2 = b.binary(BinaryOp::Add, i, 1, W);
            b.jump(header);
            b.switch_to(exit);
            b.ret(Some(i.into()));
            b.add_incoming(i, BlockId::ENTRY, 0);
            b.add_incoming(i, body, i2);
            b.add_incoming(sum, BlockId::ENTRY, 0);
            b.add_incoming(sum, body, sum2);
        }
        Program::Branch => {
            let x = b.param(W, None);
            let then_block = b.new_block();
            let else_block = b.new_block();
            let join = b.new_block();
            let c = b.cmp(Predicate::Slt, x, bound, W);
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
        }
        Program::Division => {
            let d = b.param(W, Some((-bound, bound)));
            let z = b.binary(BinaryOp::SDiv, 10, d, W);
            b.ret(Some(z.into()));
        }
        Program::Nested => {
            let n = b.param(W, Some((0, 50)));
            let outer = b.new_block();
            let inner = b.new_block();
            let inner_body = b.new_block();
            let latch = b.new_block();
            let exit = b.new_block();
            b.jump(outer);
            b.switch_to(outer);
            let i = b.phi(W);
            let c1 = b.cmp(Predicate::Slt, i, n, W);
            b.branch(c1, inner, exit);
            b.switch_to(inner);
            let j = b.phi(W);
            let c2 = b.cmp(Predicate::Slt, j, i, W);
            b.branch(c2, inner_body, latch);
            b.switch_to(inner_body);
            b.index(j, bound, W);
            let j2 = b.binary(BinaryOp::Add, j, 1, W);
            b.jump(inner);
            b.switch_to(latch);
            let i2 = b.binary(BinaryOp::Add, i, 1, W);
            b.jump(outer);
            b.switch_to(exit);
            b.ret(Some(i.into()));
            b.add_incoming(i, BlockId::ENTRY, 0);
            b.add_incoming(i, latch, i2);
            b.add_incoming(j, outer, 0);
            b.add_incoming(j, inner_body, j2);
        }
    }
    Ok(b.finish()?)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!("args = {:?}", args);

    let function = build(args.program, args.bound)?;
    println!("{}", function);

    let config = AnalysisConfig {
        widening_delay: args.widening_delay,
        narrowing_passes: if args.no_narrowing { Some(0) } else { None },
        division: if args.division_top {
            DivisionPolicy::Top
        } else {
            DivisionPolicy::Split
        },
        ..AnalysisConfig::default()
    };

    let time_analysis = std::time::Instant::now();
    let result = FixpointEngine::new(&config).analyze(&function)?;
    let time_analysis = time_analysis.elapsed();

    println!();
    for block in function.block_ids() {
        println!("{} [{}]", block, result.block_status(block));
        println!("  entry: {}", result.entry(block));
        println!("  exit:  {}", result.exit(block));
    }

    println!();
    println!("return range: {}", result.return_range);
    if result.risks.is_empty() {
        println!("no risks found");
    } else {
        println!("{} risk(s):", result.risks.len());
        for risk in &result.risks {
            println!("  {}", risk);
        }
    }
    println!(
        "iterations: {}, widenings: {}, narrowing passes: {}, converged: {}",
        result.stats.iterations, result.stats.widenings, result.stats.narrowing_passes, result.stats.converged
    );

    if args.dot {
        println!();
        println!("{}", function.to_dot(Some(&result))?);
    }

    println!("Analysis done in {:.3} s", time_analysis.as_secs_f64());
    Ok(())
}
