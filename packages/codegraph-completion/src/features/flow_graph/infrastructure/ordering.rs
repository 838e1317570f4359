//! Block orderings for the dataflow driver

use crate::features::flow_graph::domain::{BlockId, ControlFlowGraph};
use rustc_hash::{FxHashMap, FxHashSet};

/// Reverse postorder of the blocks reachable from the entry block
///
/// Iterative DFS; successors are explored in edge order so the result is
/// deterministic for a given graph.
pub fn reverse_postorder(cfg: &ControlFlowGraph) -> Vec<BlockId> {
    let mut visited = FxHashSet::default();
    let mut postorder = Vec::with_capacity(cfg.blocks.len());
    // (block, next successor index)
    let mut stack: Vec<(BlockId, usize)> = Vec::new();

    if cfg.entry_block().is_none() {
        return postorder;
    }
    visited.insert(cfg.entry);
    stack.push((cfg.entry, 0));

    while let Some((block, next)) = stack.pop() {
        let successors = cfg
            .block(block)
            .map(|b| b.successors.as_slice())
            .unwrap_or(&[]);
        if let Some(edge) = successors.get(next) {
            stack.push((block, next + 1));
            if visited.insert(edge.destination) {
                stack.push((edge.destination, 0));
            }
        } else {
            postorder.push(block);
        }
    }

    postorder.reverse();
    postorder
}

/// Edges whose destination does not come after their source in `order`
pub fn back_edges(cfg: &ControlFlowGraph, order: &[BlockId]) -> FxHashSet<(BlockId, BlockId)> {
    let position: FxHashMap<BlockId, usize> =
        order.iter().enumerate().map(|(i, b)| (*b, i)).collect();

    let mut result = FxHashSet::default();
    for block in order {
        let Some(bb) = cfg.block(*block) else { continue };
        for edge in &bb.successors {
            if let (Some(src), Some(dst)) = (position.get(&edge.source), position.get(&edge.destination)) {
                if dst <= src {
                    result.insert((edge.source, edge.destination));
                }
            }
        }
    }
    result
}
