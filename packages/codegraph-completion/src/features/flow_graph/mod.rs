/*
 * Flow Graph Module
 *
 * Owning arena for one analyzed procedure:
 * - Operations: closed sum type addressed by `OperationId`
 * - CFG: basic blocks with condition-tagged edges and exception regions
 *
 * Architecture:
 * - Domain: Operation, BasicBlock, ControlFlowGraph, Procedure
 * - Infrastructure: block ordering (RPO, back edges), ProcedureBuilder
 */

pub mod domain;
pub mod infrastructure;

pub use domain::{
    BasicBlock, BinaryOperatorKind, BlockId, BlockKind, ConditionKind, ControlFlowGraph, Edge,
    Operation, OperationId, OperationKind, OperationSite, Parameter, Procedure, RefKind, Region, RegionId,
    RegionKind, SyntaxRef,
};
pub use infrastructure::{back_edges, reverse_postorder, ProcedureBuilder};
