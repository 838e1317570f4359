//! Flow graph domain models

pub mod cfg;
pub mod operation;
pub mod procedure;

pub use cfg::{
    BasicBlock, BlockId, BlockKind, ConditionKind, ControlFlowGraph, Edge, Region, RegionId,
    RegionKind,
};
pub use operation::{
    BinaryOperatorKind, Operation, OperationId, OperationKind, OperationSite, RefKind, SyntaxRef,
};
pub use procedure::{Parameter, Procedure};
