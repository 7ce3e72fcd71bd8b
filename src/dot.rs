//! Control-flow graph to DOT (Graphviz) conversion.
//!
//! Renders a [`Function`] as a directed graph, optionally annotated with the
//! entry and exit states computed by the [`FixpointEngine`].
//!
//! # DOT Format
//!
//! - **Blocks** are boxes listing their instructions, left-justified
//! - **Edges**:
//!   - Solid lines are unconditional jumps, `then` edges and switch cases
//!   - Dashed lines are `else` edges and switch defaults
//!   - Bold lines are loop back edges
//! - **Unreachable blocks** (per the analysis) are drawn in gray
//!
//! # Examples
//!
//! ```
//! use vsa_rs::config::AnalysisConfig;
//! use vsa_rs::fixpoint::FixpointEngine;
//! use vsa_rs::ir::FunctionBuilder;
//! use vsa_rs::types::IntWidth;
//!
//! let mut b = FunctionBuilder::new("f");
//! let x = b.copy(1, IntWidth::I8);
//! b.ret(Some(x.into()));
//! let function = b.finish().unwrap();
//!
//! let config = AnalysisConfig::default();
//! let result = FixpointEngine::new(&config).analyze(&function).unwrap();
//! let dot = function.to_dot(Some(&result)).unwrap();
//! // Write to file and render with: dot -Tsvg cfg.dot -o cfg.svg
//! ```
//!
//! [`FixpointEngine`]: crate::fixpoint::FixpointEngine

use crate::dominators::Dominators;
use crate::fixpoint::FunctionAnalysis;
use crate::ir::{Function, Terminator};
use crate::types::BlockId;

/// Configuration options for DOT output generation.
///
/// Use `DotConfig::default()` for standard settings.
///
/// # Examples
///
/// ```
/// use vsa_rs::dot::DotConfig;
///
/// let config = DotConfig {
///     show_instructions: false,
///     ..DotConfig::default()
/// };
/// assert!(config.show_states);
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for blocks (default: "box")
    pub block_shape: &'static str,
    /// Style for unconditional and `then` edges (default: "solid")
    pub edge_style: &'static str,
    /// Style for `else` and switch default edges (default: "dashed")
    pub alternative_edge_style: &'static str,
    /// Style for loop back edges (default: "bold")
    pub back_edge_style: &'static str,
    /// Color of blocks the analysis proved unreachable (default: "gray")
    pub unreachable_color: &'static str,
    /// List instructions inside blocks (default: true)
    pub show_instructions: bool,
    /// Print entry and exit states, if an analysis is given (default: true)
    pub show_states: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            block_shape: "box",
            edge_style: "solid",
            alternative_edge_style: "dashed",
            back_edge_style: "bold",
            unreachable_color: "gray",
            show_instructions: true,
            show_states: true,
        }
    }
}

impl Function {
    /// Converts the control-flow graph to DOT format.
    pub fn to_dot(&self, analysis: Option<&FunctionAnalysis>) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(analysis, &DotConfig::default())
    }

    /// Converts the control-flow graph to DOT format with custom
    /// configuration.
    pub fn to_dot_with_config(
        &self,
        analysis: Option<&FunctionAnalysis>,
        config: &DotConfig,
    ) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let doms = Dominators::new(self);
        let mut dot = String::new();
        writeln!(dot, "digraph \"{}\" {{", escape(&self.name))?;
        writeln!(dot, "node [shape={}, fontname=monospace];", config.block_shape)?;

        for (index, block) in self.blocks.iter().enumerate() {
            let id = BlockId::new(index);
            let mut label = format!("{}:\\l", id);
            let states = analysis.filter(|_| config.show_states).map(|a| &a.states[index]);
            if let Some(states) = states {
                label += &format!("entry {}\\l", escape(&states.entry.to_string()));
            }
            if config.show_instructions {
                for inst in &block.instructions {
                    label += &format!("  {}\\l", escape(&inst.to_string()));
                }
                if let Some(terminator) = &block.terminator {
                    label += &format!("  {}\\l", escape(&terminator.to_string()));
                }
            }
            if let Some(states) = states {
                label += &format!("exit {}\\l", escape(&states.exit.to_string()));
            }

            let unreachable = analysis.is_some_and(|a| !a.is_reachable(id));
            if unreachable {
                writeln!(
                    dot,
                    "{} [label=\"{}\", color={}, fontcolor={}];",
                    id, label, config.unreachable_color, config.unreachable_color
                )?;
            } else {
                writeln!(dot, "{} [label=\"{}\"];", id, label)?;
            }
        }

        for (index, block) in self.blocks.iter().enumerate() {
            let from = BlockId::new(index);
            let edges: Vec<(BlockId, Option<String>, bool)> = match &block.terminator {
                Some(Terminator::Jump(target)) => vec![(*target, None, false)],
                Some(Terminator::Branch {
                    then_block, else_block, ..
                }) => vec![
                    (*then_block, Some("T".to_string()), false),
                    (*else_block, Some("F".to_string()), true),
                ],
                Some(Terminator::Switch { cases, default, .. }) => cases
                    .iter()
                    .map(|&(c, target)| (target, Some(c.to_string()), false))
                    .chain(std::iter::once((*default, Some("default".to_string()), true)))
                    .collect(),
                _ => Vec::new(),
            };
            for (to, label, alternative) in edges {
                let style = if doms.is_back_edge(from, to) {
                    config.back_edge_style
                } else if alternative {
                    config.alternative_edge_style
                } else {
                    config.edge_style
                };
                match label {
                    Some(label) => writeln!(dot, "{} -> {} [style={}, label=\"{}\"];", from, to, style, label)?,
                    None => writeln!(dot, "{} -> {} [style={}];", from, to, style)?,
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
