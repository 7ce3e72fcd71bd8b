//! Whole-module analysis.
//!
//! Functions are independent: each is analysed by its own [`FixpointEngine`]
//! run on a rayon worker, with its own per-block records. A function that
//! fails validation or trips an invariant does not affect the others.

use crate::error::{AnalysisError, Result};
use crate::fixpoint::{FixpointEngine, FunctionAnalysis};
use crate::ir::Module;

/// Per-function results of [`analyze_module`], in module order.
#[derive(Debug, Clone)]
pub struct ModuleAnalysis {
    pub functions: Vec<(String, Result<FunctionAnalysis>)>,
}

impl ModuleAnalysis {
    /// Result for a function by name.
    pub fn function(&self, name: &str) -> Option<&Result<FunctionAnalysis>> {
        self.functions.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// Successfully analysed functions.
    pub fn successes(&self) -> impl Iterator<Item = &FunctionAnalysis> {
        self.functions.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    /// Functions whose analysis failed, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &AnalysisError)> {
        self.functions
            .iter()
            .filter_map(|(n, r)| r.as_ref().err().map(|e| (n.as_str(), e)))
    }
}

/// Analyse every function of a module in parallel.
pub fn analyze_module(engine: &FixpointEngine<'_>, module: &Module) -> ModuleAnalysis {
    use rayon::prelude::*;

    log::info!("Analyzing module with {} functions", module.functions.len());
    let functions = module
        .functions
        .par_iter()
        .map(|function| {
            let result = engine.analyze(function);
            if let Err(e) = &result {
                log::warn!("Analysis of {} failed: {}", function.name, e);
            }
            (function.name.clone(), result)
        })
        .collect();
    ModuleAnalysis { functions }
}
