//! # vsa-rs: Interval value-set analysis in Rust
//!
//! **`vsa-rs`** computes sound numeric ranges for every value of a program in
//! SSA form, using abstract interpretation over the interval lattice.
//! It is meant to run as an analysis pass over an already-built control-flow
//! graph and to report potential runtime faults: division by zero, signed
//! overflow and out-of-bounds indexing.
//!
//! ## What is interval analysis?
//!
//! Every variable is approximated by an interval `[lo, hi]` that contains
//! all values it may take in any execution. The analysis "executes" the
//! program over intervals instead of concrete integers, merging paths with
//! the lattice join. Loops are handled by **widening**, which pushes unstable
//! bounds to infinity so that iteration terminates, followed by
//! **narrowing**, which recovers the precision lost in the process.
//!
//! ## Key Features
//!
//! - **Sound arithmetic**: results are computed in unbounded precision and
//!   then fitted to the bit width of the instruction, honouring its declared
//!   overflow behaviour (wraparound or fault).
//! - **Path sensitivity at branches**: comparisons refine both operands on
//!   each outgoing edge, and infeasible edges are pruned.
//! - **Terminating fixpoint**: widening at loop headers found by a dominance
//!   analysis, with a bounded narrowing phase afterwards.
//! - **Parallel module analysis**: independent functions are analysed on a
//!   [rayon](https://docs.rs/rayon) thread pool.
//!
//! ## Basic Usage
//!
//! ```rust
//! use vsa_rs::config::AnalysisConfig;
//! use vsa_rs::fixpoint::FixpointEngine;
//! use vsa_rs::interval::Interval;
//! use vsa_rs::ir::{BinaryOp, FunctionBuilder, Predicate};
//! use vsa_rs::risk::RiskKind;
//! use vsa_rs::types::IntWidth;
//!
//! // 1. Build a function: fn f(d: i32 in [-2, 2]) { return 10 / d; }
//! let mut b = FunctionBuilder::new("f");
//! let d = b.param(IntWidth::I32, Some((-2, 2)));
//! let z = b.binary(BinaryOp::SDiv, 10, d, IntWidth::I32);
//! b.ret(Some(z.into()));
//! let function = b.finish()?;
//!
//! // 2. Run the analysis
//! let config = AnalysisConfig::default();
//! let result = FixpointEngine::new(&config).analyze(&function)?;
//!
//! // 3. Inspect ranges and risks
//! assert_eq!(result.return_range, Interval::from_bounds(-10, 10));
//! assert_eq!(result.risks[0].kind, RiskKind::DivisionByZero);
//! # Ok::<(), vsa_rs::error::AnalysisError>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`interval`]**: The [`Interval`][crate::interval::Interval] lattice and its abstract arithmetic.
//! - **[`state`]**: Abstract states mapping variables to intervals.
//! - **[`ir`]**: The input control-flow graph and a builder for it.
//! - **[`transfer`]**: Abstract semantics of instructions and branches.
//! - **[`fixpoint`]**: The worklist engine with widening and narrowing.
//! - **[`dot`]**: Graphviz rendering of annotated control-flow graphs.

pub mod bound;
pub mod config;
pub mod domain;
pub mod dominators;
pub mod dot;
pub mod error;
pub mod fixpoint;
pub mod interval;
pub mod ir;
pub mod module;
pub mod risk;
pub mod state;
pub mod transfer;
pub mod types;
pub mod worklist;
