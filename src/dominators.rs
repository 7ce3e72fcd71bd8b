//! Dominance, reverse postorder and widening points.
//!
//! This is a read-only analysis of the control-flow graph computed once
//! before the fixpoint iteration starts.
//!
//! A *back edge* is an edge `u → v` where `v` dominates `u`; its target is a
//! natural loop header. Irreducible cycles have no back edge in this sense,
//! so the targets of DFS *retreating* edges (edges to a block still on the
//! DFS stack) are added as widening points as well. Every cycle of the graph
//! then passes through at least one widening point.

use crate::ir::Function;
use crate::types::BlockId;
use crate::worklist::BlockSet;

/// Dominator sets and loop structure of a function.
#[derive(Debug, Clone)]
pub struct Dominators {
    /// Blocks reachable from the entry, in reverse postorder.
    rpo: Vec<BlockId>,
    /// Position of each block in `rpo`.
    rank: Vec<Option<usize>>,
    /// `dom[b]` = set of blocks dominating `b` (empty if `b` is unreachable).
    dom: Vec<BlockSet>,
    back_edges: Vec<(BlockId, BlockId)>,
    widening_points: BlockSet,
}

impl Dominators {
    /// Analyse a function.
    pub fn new(function: &Function) -> Self {
        Self::compute(&function.successors())
    }

    /// Analyse a graph given by successor lists; block 0 is the entry.
    pub fn compute(successors: &[Vec<BlockId>]) -> Self {
        let n = successors.len();
        let (rpo, retreating) = depth_first(successors);

        let mut rank = vec![None; n];
        for (i, b) in rpo.iter().enumerate() {
            rank[b.index()] = Some(i);
        }

        let mut preds = vec![Vec::new(); n];
        for &b in &rpo {
            for &s in &successors[b.index()] {
                preds[s.index()].push(b);
            }
        }

        let mut dom = vec![BlockSet::new(n); n];
        let all: BlockSet = rpo.iter().copied().collect();
        for &b in &rpo {
            if b.is_entry() {
                dom[b.index()].insert(b);
            } else {
                dom[b.index()] = all.clone();
            }
        }

        // Dom(B) = {B} ∪ (∩ Dom(P) for P in predecessors), iterated to a fixed point.
        let mut changed = true;
        while changed {
            changed = false;
            for &b in rpo.iter().skip(1) {
                let mut new_dom = all.clone();
                for p in &preds[b.index()] {
                    new_dom.intersect_with(&dom[p.index()]);
                }
                new_dom.insert(b);
                if new_dom != dom[b.index()] {
                    dom[b.index()] = new_dom;
                    changed = true;
                }
            }
        }

        let mut back_edges = Vec::new();
        for &b in &rpo {
            for &s in &successors[b.index()] {
                if dom[b.index()].contains(s) {
                    back_edges.push((b, s));
                }
            }
        }

        let mut widening_points: BlockSet = back_edges.iter().map(|&(_, header)| header).collect();
        widening_points.extend(retreating.into_iter().map(|(_, target)| target));

        Self {
            rpo,
            rank,
            dom,
            back_edges,
            widening_points,
        }
    }

    /// Reachable blocks in reverse postorder, starting with the entry.
    pub fn reverse_postorder(&self) -> &[BlockId] {
        &self.rpo
    }

    /// Position of a block in reverse postorder, `None` if unreachable.
    pub fn rank(&self, block: BlockId) -> Option<usize> {
        self.rank.get(block.index()).copied().flatten()
    }

    /// Check if a block is reachable from the entry in the graph.
    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.rank(block).is_some()
    }

    /// Check if `a` dominates `b`. Every block dominates itself.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dom.get(b.index()).is_some_and(|d| d.contains(a))
    }

    /// The closest strict dominator of a reachable non-entry block.
    pub fn immediate_dominator(&self, block: BlockId) -> Option<BlockId> {
        let doms = self.dom.get(block.index())?;
        doms.iter()
            .filter(|&d| d != block)
            .max_by_key(|&d| doms_len(&self.dom, d))
    }

    /// Edges whose target dominates their source.
    pub fn back_edges(&self) -> &[(BlockId, BlockId)] {
        &self.back_edges
    }

    pub fn is_back_edge(&self, from: BlockId, to: BlockId) -> bool {
        self.back_edges.contains(&(from, to))
    }

    /// Check if states must be widened at this block.
    pub fn is_widening_point(&self, block: BlockId) -> bool {
        self.widening_points.contains(block)
    }

    pub fn widening_points(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.widening_points.iter()
    }
}

/// The dominators of `d` are exactly the dominators of `b` above it, so the
/// immediate dominator has the largest dominator set among them.
fn doms_len(dom: &[BlockSet], d: BlockId) -> usize {
    dom[d.index()].len()
}

/// Iterative depth-first search from the entry.
///
/// Returns the reachable blocks in reverse postorder and the retreating
/// edges (edges to a block that is still on the DFS stack).
fn depth_first(successors: &[Vec<BlockId>]) -> (Vec<BlockId>, Vec<(BlockId, BlockId)>) {
    let n = successors.len();
    let mut postorder = Vec::with_capacity(n);
    let mut retreating = Vec::new();
    if n == 0 {
        return (postorder, retreating);
    }

    let mut visited = BlockSet::new(n);
    let mut on_stack = BlockSet::new(n);
    let mut stack = vec![(BlockId::ENTRY, 0usize)];
    visited.insert(BlockId::ENTRY);
    on_stack.insert(BlockId::ENTRY);

    while let Some(top) = stack.last_mut() {
        let block = top.0;
        if let Some(&succ) = successors[block.index()].get(top.1) {
            top.1 += 1;
            if on_stack.contains(succ) {
                retreating.push((block, succ));
            } else if visited.insert(succ) {
                on_stack.insert(succ);
                stack.push((succ, 0));
            }
        } else {
            stack.pop();
            on_stack.remove(block);
            postorder.push(block);
        }
    }

    postorder.reverse();
    (postorder, retreating)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn b(i: usize) -> BlockId {
        BlockId::new(i)
    }

    fn graph(edges: &[&[usize]]) -> Vec<Vec<BlockId>> {
        edges.iter().map(|succs| succs.iter().map(|&s| b(s)).collect()).collect()
    }

    #[test]
    fn test_simple_loop() {
        // 0 → 1 → 2 → 1, 1 → 3
        let doms = Dominators::compute(&graph(&[&[1], &[2, 3], &[1], &[]]));

        assert_eq!(doms.reverse_postorder()[0], b(0));
        assert_eq!(doms.back_edges(), &[(b(2), b(1))]);
        assert!(doms.is_back_edge(b(2), b(1)));
        assert!(doms.is_widening_point(b(1)));
        assert!(!doms.is_widening_point(b(2)));
        assert!(doms.dominates(b(1), b(3)));
        assert!(!doms.dominates(b(2), b(3)));
        assert_eq!(doms.immediate_dominator(b(3)), Some(b(1)));
        assert_eq!(doms.immediate_dominator(b(0)), None);
    }

    #[test]
    fn test_diamond() {
        // 0 → {1, 2} → 3
        let doms = Dominators::compute(&graph(&[&[1, 2], &[3], &[3], &[]]));

        assert!(doms.back_edges().is_empty());
        assert_eq!(doms.widening_points().count(), 0);
        assert_eq!(doms.immediate_dominator(b(3)), Some(b(0)));
        assert_eq!(doms.rank(b(3)), Some(3));
    }

    #[test]
    fn test_self_loop() {
        let doms = Dominators::compute(&graph(&[&[1], &[1, 2], &[]]));
        assert_eq!(doms.back_edges(), &[(b(1), b(1))]);
        assert!(doms.is_widening_point(b(1)));
    }

    #[test]
    fn test_unreachable_block() {
        let doms = Dominators::compute(&graph(&[&[2], &[2], &[]]));

        assert!(!doms.is_reachable(b(1)));
        assert_eq!(doms.rank(b(1)), None);
        assert_eq!(doms.reverse_postorder(), &[b(0), b(2)]);
        assert!(doms.dominates(b(0), b(2)));
        assert!(!doms.dominates(b(1), b(2)));
    }

    #[test]
    fn test_irreducible_cycle() {
        // 0 → {1, 2}, 1 ↔ 2: neither 1 nor 2 dominates the other.
        let doms = Dominators::compute(&graph(&[&[1, 2], &[2], &[1]]));

        assert!(doms.back_edges().is_empty());
        assert_eq!(doms.widening_points().count(), 1);
    }

    #[test]
    fn test_nested_loops() {
        // 0 → 1 → 2 → 3 → 2, 3 → 4 → 1, 1 → 5
        let doms = Dominators::compute(&graph(&[&[1], &[2, 5], &[3], &[2, 4], &[1], &[]]));

        assert!(doms.is_back_edge(b(3), b(2)));
        assert!(doms.is_back_edge(b(4), b(1)));
        let points: Vec<_> = doms.widening_points().collect();
        assert_eq!(points, vec![b(1), b(2)]);
    }
}
