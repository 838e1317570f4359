/*
 * Procedure Builder
 *
 * Fluent construction of a procedure arena + CFG. Hosts lowering their own
 * IR use it as the single entry point; `build()` derives predecessors,
 * static reachability and operation→block ownership, then validates.
 *
 * # Example
 * ```rust,ignore
 * let mut b = ProcedureBuilder::new(ProcedureId(1), "Run").in_file("Program.cs");
 * let body = b.block();
 * let scope = b.new_object(ctor, scope_ty, vec![], SyntaxRef::at_line(3, "new TransactionScope()"));
 * let s = b.local(LocalId(0), Some(scope_ty));
 * let assign = b.assign(s, scope);
 * b.push(body, assign);
 * b.goto(b.entry(), body);
 * b.goto(body, b.exit());
 * let procedure = b.build()?;
 * ```
 */

use crate::errors::{CompletionError, Result};
use crate::features::flow_graph::domain::{
    BasicBlock, BinaryOperatorKind, BlockId, BlockKind, ConditionKind, ControlFlowGraph, Edge,
    Operation, OperationId, OperationKind, Parameter, Procedure, RefKind, Region, RegionId,
    RegionKind, SyntaxRef,
};
use crate::shared::models::{FieldId, LocalId, MethodId, ProcedureId, TypeId};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

pub struct ProcedureBuilder {
    id: ProcedureId,
    method: Option<MethodId>,
    name: String,
    file_path: String,
    is_constructor: bool,
    parameters: Vec<Parameter>,
    operations: Vec<Operation>,
    blocks: Vec<BasicBlock>,
    regions: Vec<Region>,
    unreachable: FxHashSet<BlockId>,
}

impl ProcedureBuilder {
    pub fn new(id: ProcedureId, name: impl Into<String>) -> Self {
        Self {
            id,
            method: None,
            name: name.into(),
            file_path: String::new(),
            is_constructor: false,
            parameters: Vec::new(),
            operations: Vec::new(),
            blocks: vec![
                BasicBlock::new(BlockId(0), BlockKind::Entry),
                BasicBlock::new(BlockId(1), BlockKind::Exit),
            ],
            regions: Vec::new(),
            unreachable: FxHashSet::default(),
        }
    }

    pub fn in_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }

    pub fn for_method(mut self, method: MethodId) -> Self {
        self.method = Some(method);
        self
    }

    pub fn as_constructor(mut self) -> Self {
        self.is_constructor = true;
        self
    }

    /// Declare a parameter, returning its index
    pub fn parameter(&mut self, name: impl Into<String>, ty: TypeId, ref_kind: RefKind) -> u32 {
        self.parameters.push(Parameter {
            name: name.into(),
            ty,
            ref_kind,
        });
        (self.parameters.len() - 1) as u32
    }

    // ── blocks ──────────────────────────────────────────────────────────

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn exit(&self) -> BlockId {
        BlockId(1)
    }

    pub fn block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::new(id, BlockKind::Block));
        id
    }

    pub fn region(&mut self, kind: RegionKind, parent: Option<RegionId>) -> RegionId {
        let id = RegionId(self.regions.len() as u32);
        self.regions.push(Region { id, kind, parent });
        id
    }

    pub fn set_region(&mut self, block: BlockId, region: RegionId) {
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.region = Some(region);
        }
    }

    /// Force a block to be statically unreachable (e.g. `if (false)` bodies)
    pub fn mark_unreachable(&mut self, block: BlockId) {
        self.unreachable.insert(block);
    }

    /// Append a root operation to a block
    pub fn push(&mut self, block: BlockId, operation: OperationId) {
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.operations.push(operation);
        }
    }

    pub fn goto(&mut self, from: BlockId, to: BlockId) {
        self.edge(from, to, ConditionKind::None);
    }

    /// Conditional exit: `value` true → `when_true`, false → `when_false`
    pub fn branch(
        &mut self,
        block: BlockId,
        value: OperationId,
        when_true: BlockId,
        when_false: BlockId,
    ) {
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.branch_value = Some(value);
        }
        self.edge(block, when_true, ConditionKind::WhenTrue);
        self.edge(block, when_false, ConditionKind::WhenFalse);
    }

    fn edge(&mut self, from: BlockId, to: BlockId, condition: ConditionKind) {
        if let Some(b) = self.blocks.get_mut(from.index()) {
            b.successors.push(Edge {
                source: from,
                destination: to,
                condition,
            });
        }
    }

    // ── operations ──────────────────────────────────────────────────────

    pub fn add(&mut self, kind: OperationKind, ty: Option<TypeId>) -> OperationId {
        let id = OperationId(self.operations.len() as u32);
        let mut operation = Operation::new(id, kind);
        operation.ty = ty;
        for child in operation.children() {
            if let Some(c) = self.operations.get_mut(child.index()) {
                c.parent = Some(id);
            }
        }
        self.operations.push(operation);
        id
    }

    pub fn with_syntax(&mut self, operation: OperationId, syntax: SyntaxRef) -> OperationId {
        if let Some(op) = self.operations.get_mut(operation.index()) {
            op.syntax = Some(syntax);
        }
        operation
    }

    pub fn literal(&mut self, ty: Option<TypeId>) -> OperationId {
        self.add(OperationKind::Literal, ty)
    }

    pub fn null(&mut self) -> OperationId {
        self.add(OperationKind::NullLiteral, None)
    }

    pub fn local(&mut self, local: LocalId, ty: Option<TypeId>) -> OperationId {
        self.add(OperationKind::LocalReference { local }, ty)
    }

    pub fn parameter_ref(&mut self, index: u32, ty: Option<TypeId>) -> OperationId {
        self.add(OperationKind::ParameterReference { index }, ty)
    }

    pub fn this(&mut self, ty: Option<TypeId>) -> OperationId {
        self.add(OperationKind::InstanceReference, ty)
    }

    pub fn field(
        &mut self,
        field: FieldId,
        instance: Option<OperationId>,
        ty: Option<TypeId>,
    ) -> OperationId {
        self.add(OperationKind::FieldReference { field, instance }, ty)
    }

    pub fn argument(
        &mut self,
        index: u32,
        ref_kind: RefKind,
        parameter_type: Option<TypeId>,
        value: OperationId,
    ) -> OperationId {
        self.add(
            OperationKind::Argument {
                index,
                ref_kind,
                value,
            },
            parameter_type,
        )
    }

    pub fn new_object(
        &mut self,
        constructor: MethodId,
        ty: TypeId,
        arguments: Vec<OperationId>,
        syntax: SyntaxRef,
    ) -> OperationId {
        let id = self.add(
            OperationKind::ObjectCreation {
                constructor,
                arguments,
            },
            Some(ty),
        );
        self.with_syntax(id, syntax)
    }

    pub fn invoke(
        &mut self,
        method: MethodId,
        instance: Option<OperationId>,
        arguments: Vec<OperationId>,
        return_type: Option<TypeId>,
    ) -> OperationId {
        self.add(
            OperationKind::Invocation {
                method,
                instance,
                arguments,
            },
            return_type,
        )
    }

    pub fn assign(&mut self, target: OperationId, value: OperationId) -> OperationId {
        let ty = self.operations.get(value.index()).and_then(|op| op.ty);
        self.add(OperationKind::Assignment { target, value }, ty)
    }

    pub fn conversion(&mut self, operand: OperationId, ty: Option<TypeId>) -> OperationId {
        self.add(OperationKind::Conversion { operand }, ty)
    }

    pub fn binary(
        &mut self,
        operator: BinaryOperatorKind,
        left: OperationId,
        right: OperationId,
        bool_type: Option<TypeId>,
    ) -> OperationId {
        self.add(
            OperationKind::BinaryOperator {
                operator,
                left,
                right,
            },
            bool_type,
        )
    }

    pub fn is_null(&mut self, operand: OperationId, bool_type: Option<TypeId>) -> OperationId {
        self.add(OperationKind::IsNull { operand }, bool_type)
    }

    pub fn ret(&mut self, value: Option<OperationId>) -> OperationId {
        self.add(OperationKind::Return { value }, None)
    }

    pub fn throw(&mut self, value: Option<OperationId>) -> OperationId {
        self.add(OperationKind::Throw { value }, None)
    }

    pub fn lambda(
        &mut self,
        body: Option<ProcedureId>,
        captures: Vec<LocalId>,
        delegate_type: Option<TypeId>,
    ) -> OperationId {
        self.add(OperationKind::DelegateCreation { body, captures }, delegate_type)
    }

    pub fn other(&mut self, children: Vec<OperationId>, ty: Option<TypeId>) -> OperationId {
        self.add(OperationKind::Other { children }, ty)
    }

    // ── finish ──────────────────────────────────────────────────────────

    pub fn build(mut self) -> Result<Procedure> {
        for block in &mut self.blocks {
            block.predecessors.clear();
        }
        let edges: Vec<Edge> = self
            .blocks
            .iter()
            .flat_map(|b| b.successors.iter().copied())
            .collect();
        for edge in &edges {
            let Some(dst) = self.blocks.get_mut(edge.destination.index()) else {
                return Err(CompletionError::invalid_graph(format!(
                    "edge {} -> {} targets a missing block",
                    edge.source, edge.destination
                )));
            };
            if !dst.predecessors.contains(&edge.source) {
                dst.predecessors.push(edge.source);
            }
        }

        self.compute_reachability();
        let operation_blocks = self.compute_operation_blocks();

        let cfg = ControlFlowGraph {
            blocks: self.blocks,
            regions: self.regions,
            entry: BlockId(0),
            exit: BlockId(1),
        };
        cfg.validate().map_err(CompletionError::InvalidGraph)?;

        Ok(Procedure {
            id: self.id,
            method: self.method,
            name: self.name,
            file_path: self.file_path,
            is_constructor: self.is_constructor,
            parameters: self.parameters,
            operations: self.operations,
            operation_blocks,
            cfg,
        })
    }

    fn compute_reachability(&mut self) {
        let mut reachable = vec![false; self.blocks.len()];
        let mut queue = VecDeque::from([BlockId(0)]);
        reachable[0] = true;
        while let Some(block) = queue.pop_front() {
            if self.unreachable.contains(&block) {
                continue;
            }
            for edge in &self.blocks[block.index()].successors {
                let index = edge.destination.index();
                if !reachable[index] && !self.unreachable.contains(&edge.destination) {
                    reachable[index] = true;
                    queue.push_back(edge.destination);
                }
            }
        }
        for (block, is_reachable) in self.blocks.iter_mut().zip(reachable) {
            block.is_reachable = is_reachable && !self.unreachable.contains(&block.id);
        }
    }

    fn compute_operation_blocks(&self) -> Vec<Option<BlockId>> {
        let mut owners = vec![None; self.operations.len()];
        for block in &self.blocks {
            let roots = block.operations.iter().chain(block.branch_value.iter());
            for root in roots {
                let mut stack = vec![*root];
                while let Some(id) = stack.pop() {
                    let Some(op) = self.operations.get(id.index()) else {
                        continue;
                    };
                    if owners[id.index()].is_none() {
                        owners[id.index()] = Some(block.id);
                        stack.extend(op.children());
                    }
                }
            }
        }
        owners
    }
}
