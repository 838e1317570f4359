//! Procedure: the owning arena for operations and their CFG

use super::cfg::{BlockId, ControlFlowGraph};
use super::operation::{Operation, OperationId, OperationKind, RefKind};
use crate::shared::models::{MethodId, ProcedureId, TypeId};
use serde::{Deserialize, Serialize};

/// Formal parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    pub ref_kind: RefKind,
}

/// Analyzed procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: ProcedureId,

    /// Method symbol of the body (None for lambdas without a symbol)
    pub method: Option<MethodId>,

    pub name: String,
    pub file_path: String,
    pub is_constructor: bool,
    pub parameters: Vec<Parameter>,

    /// Arena indexed by `OperationId`
    pub operations: Vec<Operation>,

    /// Block owning each operation (`None` for detached operations)
    pub operation_blocks: Vec<Option<BlockId>>,

    pub cfg: ControlFlowGraph,
}

impl Procedure {
    #[inline]
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.index())
    }

    pub fn block_of(&self, id: OperationId) -> Option<BlockId> {
        self.operation_blocks.get(id.index()).copied().flatten()
    }

    pub fn is_inside_catch_region(&self, id: OperationId) -> bool {
        self.block_of(id)
            .map_or(false, |block| self.cfg.is_inside_catch_region(block))
    }

    /// Values returned by `return` operations
    pub fn returned_values(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.operations.iter().filter_map(|op| match op.kind {
            OperationKind::Return { value } => value,
            _ => None,
        })
    }

    /// Number of operations in the arena
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
