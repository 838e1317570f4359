/*
 * CFG (Control Flow Graph)
 *
 * Basic blocks with:
 * - ordered root operations
 * - an optional branch value evaluated on each conditional edge
 * - successor edges tagged with the branch condition they are taken under
 * - innermost enclosing exception region
 */

use super::operation::OperationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic block id (index into `ControlFlowGraph::blocks`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Entry,
    Exit,
    Block,
}

/// Condition under which an edge is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Unconditional / fall-through
    None,
    /// Branch value evaluated to true
    WhenTrue,
    /// Branch value evaluated to false
    WhenFalse,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::None => "UNCONDITIONAL",
            ConditionKind::WhenTrue => "TRUE",
            ConditionKind::WhenFalse => "FALSE",
        }
    }
}

/// CFG edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: BlockId,
    pub destination: BlockId,
    pub condition: ConditionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    Try,
    Catch,
    Filter,
    FilterAndHandler,
    Finally,
}

/// Exception region; regions nest through `parent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub kind: RegionKind,
    pub parent: Option<RegionId>,
}

/// Basic block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub kind: BlockKind,

    /// Root operations in execution order
    pub operations: Vec<OperationId>,

    /// Condition evaluated when leaving the block (visited once per outgoing edge)
    pub branch_value: Option<OperationId>,

    pub successors: Vec<Edge>,
    pub predecessors: Vec<BlockId>,

    /// Innermost enclosing region
    pub region: Option<RegionId>,

    /// Static reachability from the entry block
    pub is_reachable: bool,
}

impl BasicBlock {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            operations: Vec::new(),
            branch_value: None,
            successors: Vec::new(),
            predecessors: Vec::new(),
            region: None,
            is_reachable: true,
        }
    }
}

/// Control flow graph of one procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    pub blocks: Vec<BasicBlock>,
    pub regions: Vec<Region>,
    pub entry: BlockId,
    pub exit: BlockId,
}

impl ControlFlowGraph {
    #[inline]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.block(self.entry)
    }

    pub fn exit_block(&self) -> Option<&BasicBlock> {
        self.block(self.exit)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Whether `block` sits inside a catch (or filter handler) region at any nesting level
    pub fn is_inside_catch_region(&self, block: BlockId) -> bool {
        let mut current = self.block(block).and_then(|b| b.region);
        while let Some(region) = current.and_then(|id| self.region(id)) {
            if matches!(region.kind, RegionKind::Catch | RegionKind::FilterAndHandler) {
                return true;
            }
            current = region.parent;
        }
        false
    }

    /// Edges entering `block`
    pub fn incoming_edges(&self, block: BlockId) -> impl Iterator<Item = &Edge> + '_ {
        self.blocks
            .iter()
            .flat_map(|b| b.successors.iter())
            .filter(move |e| e.destination == block)
    }

    /// Structural checks: entry/exit kinds, edge endpoints in range, id == index
    pub fn validate(&self) -> Result<(), String> {
        match self.entry_block() {
            Some(b) if b.kind == BlockKind::Entry => {}
            _ => return Err(format!("entry {} is not an Entry block", self.entry)),
        }
        match self.exit_block() {
            Some(b) if b.kind == BlockKind::Exit => {}
            _ => return Err(format!("exit {} is not an Exit block", self.exit)),
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if block.id.index() != index {
                return Err(format!("block {} stored at index {}", block.id, index));
            }
            for edge in &block.successors {
                if edge.source != block.id || self.block(edge.destination).is_none() {
                    return Err(format!(
                        "dangling edge {} -> {}",
                        edge.source, edge.destination
                    ));
                }
            }
            if let Some(region) = block.region {
                if self.region(region).is_none() {
                    return Err(format!("block {} references unknown region", block.id));
                }
            }
        }
        Ok(())
    }
}
