/*
 * Completion Transfer Function
 *
 * Flows completion states across a block's operations.
 *
 * # Rules
 * - Creation (`new T`, static factory returning T, `out T` argument) → NotCompleted
 * - `instance.Complete()` → Completed, evidence += call
 * - Escape sets from the points-to oracle → Escaped, evidence = {escaping op}
 * - Null checks on a branch edge → Invalid on the null path
 * - Calls: callee body analyzed in a child context, or degraded to Unknown
 *
 * Operations are visited children first; escapes of an operation are applied
 * after the operation itself. A block's branch value is visited once with the
 * block; each conditional edge then re-applies only the rules that depend on
 * the condition (null checks, the TryGet false path).
 */

use super::analysis::run_completion_analysis;
use super::context::CompletionAnalysisContext;
use super::result::{AnalysisStats, CompletionAnalysisResult};
use crate::errors::Result;
use crate::features::completion::domain::{
    CompletionAbstractValue, CompletionAnalysisData, CompletionAnalysisDomain, CompletionValueDomain,
    CompletionValueKind,
};
use crate::features::completion::ports::{CalleeBody, MethodSignature, TypeKind};
use crate::features::dataflow::{AbstractDomain, MapDomain, TransferFunction};
use crate::features::flow_graph::{
    BasicBlock, BinaryOperatorKind, BlockKind, ConditionKind, Edge, Operation, OperationId,
    OperationKind, OperationSite, Procedure, RefKind,
};
use crate::features::points_to::{AbstractLocation, LocationSet, NullAbstractValue, PointsToValue};
use crate::shared::models::{FieldId, MethodId, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Call shape an argument belongs to
#[derive(Debug, Clone, Copy)]
enum CallKind {
    Constructor,
    Method {
        is_factory: bool,
        /// `bool TryGetXxx(...)`
        try_get: bool,
    },
}

pub struct CompletionVisitor<'c> {
    context: &'c CompletionAnalysisContext<'c>,
    domain: CompletionAnalysisDomain,

    /// Data being transformed by the current block / edge
    data: CompletionAnalysisData,

    block_reachable: bool,
    condition: ConditionKind,

    /// `this.field` → points-to of its default instance (field-tracking mode)
    tracked_fields: Option<FxHashMap<FieldId, PointsToValue>>,

    /// Memoized target test per type
    target_types: FxHashMap<TypeId, bool>,

    /// Call sites analyzed interprocedurally, with the callee's latest stats
    analyzed_calls: FxHashMap<OperationId, AnalysisStats>,

    /// Call sites degraded to Unknown
    degraded_calls: FxHashSet<OperationId>,
}

impl<'c> CompletionVisitor<'c> {
    pub fn new(context: &'c CompletionAnalysisContext<'c>) -> Self {
        Self {
            context,
            domain: MapDomain::new(CompletionValueDomain),
            data: CompletionAnalysisData::new(),
            block_reachable: true,
            condition: ConditionKind::None,
            tracked_fields: context
                .config
                .track_instance_fields
                .then(FxHashMap::default),
            target_types: FxHashMap::default(),
            analyzed_calls: FxHashMap::default(),
            degraded_calls: FxHashSet::default(),
        }
    }

    /// Tracked instance fields and interprocedural counters
    ///
    /// Counters are per call site, however often the fixpoint revisits it.
    pub fn finish(self) -> (Option<FxHashMap<FieldId, PointsToValue>>, AnalysisStats) {
        let mut stats = AnalysisStats {
            interprocedural_calls: self.analyzed_calls.len(),
            degraded_calls: self.degraded_calls.len(),
            ..AnalysisStats::default()
        };
        for callee in self.analyzed_calls.values() {
            stats.absorb_callee(callee);
        }
        (self.tracked_fields, stats)
    }

    #[inline]
    fn procedure(&self) -> &'c Procedure {
        self.context.procedure
    }

    #[inline]
    fn site(&self, operation: OperationId) -> OperationSite {
        OperationSite::new(self.context.procedure.id, operation)
    }

    // ── type tests ──────────────────────────────────────────────────────

    fn is_target(&mut self, ty: Option<TypeId>) -> bool {
        let Some(ty) = ty else {
            return false;
        };
        let context = self.context;
        *self.target_types.entry(ty).or_insert_with(|| {
            let symbols = context.symbols;
            symbols
                .type_kind(ty)
                .map_or(true, TypeKind::is_reference_like)
                && symbols.is_target(ty, context.target.target_type)
        })
    }

    fn is_trackable(&mut self, location: &AbstractLocation) -> bool {
        !location.is_null() && self.is_target(location.ty)
    }

    fn is_factory(&self, signature: &MethodSignature) -> bool {
        signature.is_static && signature.return_type == Some(self.context.target.target_type)
    }

    fn returns_bool(&self, signature: &MethodSignature) -> bool {
        signature
            .return_type
            .and_then(|ty| self.context.symbols.type_kind(ty))
            == Some(TypeKind::Boolean)
    }

    /// Values of this type may carry a completion state across a call
    fn can_carry_target(&mut self, ty: TypeId) -> bool {
        matches!(
            self.context.symbols.type_kind(ty),
            Some(TypeKind::Object | TypeKind::Delegate)
        ) || self.is_target(Some(ty))
    }

    fn may_pass_target_values(&mut self, signature: &MethodSignature) -> bool {
        if signature.return_type.map_or(false, |ty| self.can_carry_target(ty)) {
            return true;
        }
        signature
            .parameter_types
            .iter()
            .any(|ty| self.can_carry_target(*ty))
    }

    // ── data updates ────────────────────────────────────────────────────

    fn set_value(&mut self, location: AbstractLocation, value: CompletionAbstractValue) {
        if self.is_trackable(&location) {
            self.data.insert(location, value);
        }
    }

    fn set_all(&mut self, locations: &LocationSet, value: &CompletionAbstractValue) {
        for location in locations.iter() {
            self.set_value(*location, value.clone());
        }
    }

    fn handle_creation(
        &mut self,
        ty: Option<TypeId>,
        points_to: &PointsToValue,
    ) -> CompletionAbstractValue {
        if !self.is_target(ty) || !self.block_reachable {
            return CompletionAbstractValue::non_target();
        }
        let value = CompletionAbstractValue::not_completed();
        self.set_all(&points_to.locations, &value);
        value
    }

    fn handle_completion(&mut self, invocation: OperationId, instance: Option<OperationId>) {
        let Some(instance) = instance else {
            return;
        };
        let instance_ty = self.procedure().operation(instance).and_then(|op| op.ty);
        if !self.is_target(instance_ty) {
            return;
        }
        let site = self.site(invocation);
        let locations = self.context.points_to.points_to(instance).locations;
        for location in locations.iter() {
            let completed = match self.data.get(location) {
                Some(current) if current.kind() != CompletionValueKind::NonTarget => {
                    current.with_new_completion(site)
                }
                _ => continue,
            };
            self.set_value(*location, completed);
        }
    }

    fn escape(&mut self, operation: OperationId, locations: &LocationSet) {
        let site = self.site(operation);
        for location in locations.iter() {
            let escaped = match self.data.get(location) {
                Some(current)
                    if !matches!(
                        current.kind(),
                        CompletionValueKind::Unknown | CompletionValueKind::NonTarget
                    ) =>
                {
                    current.with_new_escape(site)
                }
                _ => continue,
            };
            self.set_value(*location, escaped);
        }
    }

    /// Locations of `operation` cannot exist on the current path
    fn invalidate(&mut self, operation: OperationId) {
        let locations = self.context.points_to.points_to(operation).locations;
        for location in locations.iter() {
            let tracked = self
                .data
                .get(location)
                .map_or(false, |v| v.kind() != CompletionValueKind::NonTarget);
            if tracked {
                self.set_value(*location, CompletionAbstractValue::invalid());
            }
        }
    }

    fn apply_escapes(&mut self, operation: &Operation) {
        match operation.kind {
            // returned values flow back to the caller instead
            OperationKind::Return { .. } if self.context.is_callee() => return,
            // decided once the call is processed (see `post_process_argument`)
            OperationKind::Argument { ref_kind, .. } if ref_kind != RefKind::None => return,
            _ => {}
        }
        let escaped = self.context.points_to.escaped_locations(operation.id);
        if !escaped.is_empty() {
            self.escape(operation.id, &escaped);
        }
    }

    // ── operations ──────────────────────────────────────────────────────

    fn visit(&mut self, id: OperationId) -> Result<()> {
        let procedure = self.procedure();
        let Some(op) = procedure.operation(id) else {
            return Ok(());
        };

        #[cfg(feature = "trace")]
        tracing::trace!(
            procedure = %procedure.name,
            operation = %id,
            condition = self.condition.as_str(),
            "Visit operation"
        );

        match &op.kind {
            OperationKind::ObjectCreation { arguments, .. } => {
                self.visit_all(arguments)?;
                self.visit_object_creation(op, arguments);
            }
            OperationKind::Invocation {
                method,
                instance,
                arguments,
            } => {
                if let Some(instance) = instance {
                    self.visit(*instance)?;
                }
                self.visit_all(arguments)?;
                self.visit_invocation(op, *method, *instance, arguments)?;
            }
            OperationKind::FieldReference { field, instance } => {
                if let Some(instance) = instance {
                    self.visit(*instance)?;
                }
                self.visit_field_reference(op, *field, *instance);
            }
            _ => {
                for child in op.children() {
                    self.visit(child)?;
                }
            }
        }

        self.apply_escapes(op);
        Ok(())
    }

    fn visit_all(&mut self, operations: &[OperationId]) -> Result<()> {
        for &operation in operations {
            self.visit(operation)?;
        }
        Ok(())
    }

    fn visit_object_creation(&mut self, op: &Operation, arguments: &[OperationId]) {
        for &argument in arguments {
            self.post_process_argument(argument, CallKind::Constructor, true, false);
        }
        let points_to = self.context.points_to.points_to(op.id);
        self.handle_creation(op.ty, &points_to);
    }

    fn visit_invocation(
        &mut self,
        op: &Operation,
        method: MethodId,
        instance: Option<OperationId>,
        arguments: &[OperationId],
    ) -> Result<()> {
        if method == self.context.target.completion_method {
            self.handle_completion(op.id, instance);
            return Ok(());
        }

        let signature = self.context.symbols.method(method);
        let analyzed = match &signature {
            Some(signature) => self.analyze_callee(op, method, signature, arguments)?,
            None => false,
        };
        if !analyzed {
            self.degrade(op, signature.as_ref(), arguments);
        }

        let is_factory = signature.as_ref().map_or(false, |s| self.is_factory(s));
        let returns_bool = signature.as_ref().map_or(false, |s| self.returns_bool(s));
        let call = CallKind::Method {
            is_factory,
            try_get: returns_bool
                && signature
                    .as_ref()
                    .map_or(false, |s| s.name.starts_with("TryGet")),
        };
        for (position, &argument) in arguments.iter().enumerate() {
            let is_last = position + 1 == arguments.len();
            self.post_process_argument(argument, call, !analyzed, is_last);
        }

        // static factories (`Scope.Create()`) are creations
        if is_factory {
            let points_to = self.context.points_to.points_to(op.id);
            self.handle_creation(op.ty, &points_to);
        }
        Ok(())
    }

    fn is_ownership_transfer(&self, ref_kind: RefKind, call: CallKind) -> bool {
        // out arguments always stay with the caller
        if ref_kind == RefKind::Out {
            return false;
        }
        let options = self.context.options;
        match call {
            CallKind::Constructor => options.ownership_transfer_at_constructor,
            CallKind::Method { is_factory, .. } => {
                options.ownership_transfer_at_method_call || is_factory
            }
        }
    }

    /// Argument effects once the call has been processed
    ///
    /// `escaped`: the callee was not analyzed, so the argument is handed to
    /// unknown code.
    fn post_process_argument(
        &mut self,
        argument: OperationId,
        call: CallKind,
        escaped: bool,
        is_last: bool,
    ) {
        let Some(op) = self.procedure().operation(argument) else {
            return;
        };
        let OperationKind::Argument {
            ref_kind, value, ..
        } = op.kind
        else {
            return;
        };
        let points_to = self.context.points_to;

        if ref_kind == RefKind::Out {
            // `TryGet(out var scope)` included: the caller owns what comes back
            let created = points_to.points_to(argument);
            self.handle_creation(op.ty, &created);
        }

        if escaped {
            if self.is_ownership_transfer(ref_kind, call) {
                let transferred = points_to.points_to(value).locations;
                self.escape(argument, &transferred);
                return;
            }
            // `TryGetScope(ref scope)` hands back an instance the caller owns
            if ref_kind == RefKind::Ref
                && is_last
                && matches!(call, CallKind::Method { try_get: true, .. })
            {
                let handed_back = points_to.points_to(value).locations;
                self.set_all(&handed_back, &CompletionAbstractValue::not_completed());
                return;
            }
        }

        // an analyzed callee hands the parameter state back instead
        if escaped && ref_kind != RefKind::None {
            let escaped_locations = points_to.escaped_locations(argument);
            self.escape(argument, &escaped_locations);
        }
    }

    fn visit_field_reference(
        &mut self,
        op: &Operation,
        field: FieldId,
        instance: Option<OperationId>,
    ) {
        if self.tracked_fields.is_none() {
            return;
        }
        let through_this = instance
            .and_then(|id| self.procedure().operation(id))
            .map_or(false, |i| matches!(i.kind, OperationKind::InstanceReference));
        if !through_this {
            return;
        }

        let points_to = self.context.points_to.points_to(op.id);
        let Some(location) = points_to.single_location().copied() else {
            return;
        };
        if !location.is_field_default() {
            return;
        }

        let already_tracked = self
            .tracked_fields
            .as_ref()
            .map_or(false, |tracked| tracked.contains_key(&field));
        if !already_tracked {
            // first reference on any path: the field's initial content is a creation
            let value = self.handle_creation(op.ty, &points_to);
            if value.kind() == CompletionValueKind::NotCompleted {
                if let Some(tracked) = self.tracked_fields.as_mut() {
                    tracked.insert(field, points_to);
                }
            }
        } else if !self.data.contains_key(&location) {
            // tracked on another path; create on this one too
            self.handle_creation(op.ty, &points_to);
        }
    }

    fn visit_null_comparison(
        &mut self,
        operator: BinaryOperatorKind,
        left: OperationId,
        right: OperationId,
    ) {
        let on_null_path = (self.condition == ConditionKind::WhenTrue && operator.is_equality())
            || (self.condition == ConditionKind::WhenFalse && operator.is_inequality());
        if !on_null_path {
            return;
        }
        let points_to = self.context.points_to;
        if points_to.null_value(right) == NullAbstractValue::Null {
            self.invalidate(left);
        } else if points_to.null_value(left) == NullAbstractValue::Null {
            self.invalidate(right);
        }
    }

    // ── branch conditions ───────────────────────────────────────────────

    /// Condition-sensitive rules for the branch value on one outgoing edge
    ///
    /// The branch value itself was already visited with the block.
    fn refine_on_edge(&mut self, id: OperationId) {
        let Some(op) = self.procedure().operation(id) else {
            return;
        };
        for child in op.children() {
            self.refine_on_edge(child);
        }
        match &op.kind {
            OperationKind::BinaryOperator {
                operator,
                left,
                right,
            } => self.visit_null_comparison(*operator, *left, *right),
            OperationKind::IsNull { operand } if self.condition == ConditionKind::WhenTrue => {
                self.invalidate(*operand);
            }
            OperationKind::Invocation {
                method, arguments, ..
            } => self.refine_try_get(op.id, *method, arguments),
            _ => {}
        }
    }

    /// `if (!TryGet(out var scope)) return;` → nothing was created on the false path
    fn refine_try_get(&mut self, invocation: OperationId, method: MethodId, arguments: &[OperationId]) {
        if self.condition != ConditionKind::WhenFalse || self.analyzed_calls.contains_key(&invocation) {
            return;
        }
        let returns_bool = self
            .context
            .symbols
            .method(method)
            .map_or(false, |s| self.returns_bool(&s));
        if !returns_bool {
            return;
        }
        for &argument in arguments {
            let is_out = self
                .procedure()
                .operation(argument)
                .map_or(false, |a| {
                    matches!(a.kind, OperationKind::Argument { ref_kind: RefKind::Out, .. })
                });
            if is_out {
                self.invalidate(argument);
            }
        }
    }

    // ── interprocedural ─────────────────────────────────────────────────

    /// Analyze the callee in a child context; `false` if the call was not analyzed
    fn analyze_callee(
        &mut self,
        op: &Operation,
        method: MethodId,
        signature: &MethodSignature,
        arguments: &[OperationId],
    ) -> Result<bool> {
        let context = self.context;
        if !context.config.interprocedural {
            return Ok(false);
        }
        if !self.may_pass_target_values(signature) {
            return Ok(false);
        }
        if context.is_on_call_chain(method) {
            tracing::debug!(method = %method, depth = context.depth, "Recursive call; not descending");
            return Ok(false);
        }
        if !context.can_descend() {
            tracing::debug!(
                method = %method,
                depth = context.depth,
                max_depth = context.config.max_interprocedural_depth,
                "Interprocedural depth budget exhausted"
            );
            return Ok(false);
        }
        let Some(callee) = context.procedures.callee_body(method) else {
            return Ok(false);
        };
        context.cancellation.check()?;

        let initial = self.seed_callee_data(&callee, arguments);
        let child = context.for_callee(&callee, initial);
        let result = match run_completion_analysis(&child) {
            Ok(result) => result,
            Err(err) if err.is_soft() => {
                tracing::debug!(callee = %callee.procedure.name, error = %err, "Callee analysis failed");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        self.degraded_calls.remove(&op.id);
        self.analyzed_calls.insert(op.id, result.stats.clone());
        self.apply_callee_result(op, &callee, arguments, &result);
        Ok(true)
    }

    fn merged_state(
        &self,
        data: &CompletionAnalysisData,
        locations: &LocationSet,
    ) -> Option<CompletionAbstractValue> {
        let domain = self.domain.value_domain();
        locations
            .iter()
            .filter_map(|location| data.get(location))
            .fold(None, |acc: Option<CompletionAbstractValue>, value| {
                Some(match acc {
                    Some(acc) => domain.merge(&acc, value),
                    None => value.clone(),
                })
            })
    }

    /// By-value / by-ref arguments: (parameter index, caller locations)
    fn argument_bindings(&self, arguments: &[OperationId]) -> Vec<(u32, LocationSet)> {
        arguments
            .iter()
            .filter_map(|&argument| match self.procedure().operation(argument)?.kind {
                OperationKind::Argument {
                    index,
                    ref_kind: RefKind::None | RefKind::Ref,
                    value,
                } => Some((index, self.context.points_to.points_to(value).locations)),
                _ => None,
            })
            .collect()
    }

    /// Caller data plus callee parameter locations seeded from the arguments
    fn seed_callee_data(
        &mut self,
        callee: &CalleeBody,
        arguments: &[OperationId],
    ) -> CompletionAnalysisData {
        let mut seeded = self.data.clone();
        for (index, caller_locations) in self.argument_bindings(arguments) {
            let Some(state) = self.merged_state(&self.data, &caller_locations) else {
                continue;
            };
            let parameter_locations = callee.points_to.parameter_points_to(index).locations;
            for location in parameter_locations.iter() {
                if self.is_trackable(location) {
                    seeded.insert(*location, state.clone());
                }
            }
        }
        seeded
    }

    fn apply_callee_result(
        &mut self,
        op: &Operation,
        callee: &CalleeBody,
        arguments: &[OperationId],
        result: &CompletionAnalysisResult,
    ) {
        if let (Some(mine), Some(theirs)) = (
            self.tracked_fields.as_mut(),
            result.tracked_instance_fields.as_ref(),
        ) {
            for (field, points_to) in theirs {
                mine.entry(*field).or_insert_with(|| points_to.clone());
            }
        }

        let Some(exit) = result.exit_data() else {
            tracing::debug!(callee = %callee.procedure.name, "Callee has no normal exit");
            return;
        };

        // shared locations (caller allocations, field defaults)
        for (location, value) in exit.iter() {
            if self.data.contains_key(location) {
                self.data.insert(*location, value.clone());
            }
        }

        // parameters → caller argument locations
        for (index, caller_locations) in self.argument_bindings(arguments) {
            let parameter_locations = callee.points_to.parameter_points_to(index).locations;
            let Some(state) = self.merged_state(exit, &parameter_locations) else {
                continue;
            };
            for location in caller_locations.iter() {
                if self.data.contains_key(location) {
                    self.set_value(*location, state.clone());
                }
            }
        }

        // returned locations → invocation result
        if self.is_target(op.ty) {
            let returned: LocationSet = callee
                .procedure
                .returned_values()
                .flat_map(|value| callee.points_to.points_to(value).locations)
                .collect();
            if let Some(state) = self.merged_state(exit, &returned) {
                let result_locations = self.context.points_to.points_to(op.id).locations;
                self.set_all(&result_locations, &state);
            }
        }
    }

    /// Call not analyzed: target-typed results and ref arguments lose their state
    fn degrade(
        &mut self,
        op: &Operation,
        signature: Option<&MethodSignature>,
        arguments: &[OperationId],
    ) {
        let relevant = signature.map_or(true, |s| self.may_pass_target_values(s));
        if !relevant {
            return;
        }
        self.analyzed_calls.remove(&op.id);
        self.degraded_calls.insert(op.id);

        let unknown = CompletionAbstractValue::unknown();
        if self.is_target(op.ty) {
            let locations = self.context.points_to.points_to(op.id).locations;
            self.set_all(&locations, &unknown);
        }

        for &argument in arguments {
            let Some(&OperationKind::Argument {
                ref_kind: RefKind::Ref,
                value,
                ..
            }) = self.procedure().operation(argument).map(|a| &a.kind)
            else {
                continue;
            };
            let locations = self.context.points_to.points_to(value).locations;
            for location in locations.iter() {
                if self.data.contains_key(location) {
                    self.set_value(*location, unknown.clone());
                }
            }
        }
    }

    // ── procedure boundaries ────────────────────────────────────────────

    /// Ownership of whatever ref/out parameters hold leaves with the caller
    fn release_by_ref_parameters(&mut self) {
        let procedure = self.procedure();
        for (index, parameter) in procedure.parameters.iter().enumerate() {
            if parameter.ref_kind == RefKind::None {
                continue;
            }
            let locations = self
                .context
                .points_to
                .parameter_points_to(index as u32)
                .locations;
            self.set_all(&locations, &CompletionAbstractValue::unknown());
        }
    }
}

impl<'c> TransferFunction for CompletionVisitor<'c> {
    type Domain = CompletionAnalysisDomain;

    fn domain(&self) -> &CompletionAnalysisDomain {
        &self.domain
    }

    fn initial_data(&mut self) -> CompletionAnalysisData {
        self.data = self.context.initial_data.clone().unwrap_or_default();

        let procedure = self.procedure();
        if self.context.options.ownership_transfer_at_constructor && procedure.is_constructor {
            for index in 0..procedure.parameters.len() {
                let locations = self
                    .context
                    .points_to
                    .parameter_points_to(index as u32)
                    .locations;
                for location in locations.iter() {
                    if !self.data.contains_key(location) {
                        self.set_value(*location, CompletionAbstractValue::not_completed());
                    }
                }
            }
        }
        std::mem::take(&mut self.data)
    }

    fn visit_block(
        &mut self,
        block: &BasicBlock,
        input: CompletionAnalysisData,
    ) -> Result<CompletionAnalysisData> {
        self.data = input;
        self.block_reachable = block.is_reachable;
        self.condition = ConditionKind::None;

        for &operation in &block.operations {
            self.visit(operation)?;
        }
        if let Some(branch_value) = block.branch_value {
            self.visit(branch_value)?;
        }
        if block.kind == BlockKind::Exit && !self.context.is_callee() {
            self.release_by_ref_parameters();
        }
        Ok(std::mem::take(&mut self.data))
    }

    fn visit_edge(
        &mut self,
        block: &BasicBlock,
        edge: &Edge,
        output: CompletionAnalysisData,
    ) -> Result<CompletionAnalysisData> {
        let Some(branch_value) = block.branch_value else {
            return Ok(output);
        };
        if edge.condition == ConditionKind::None {
            return Ok(output);
        }
        self.data = output;
        self.block_reachable = block.is_reachable;
        self.condition = edge.condition;
        self.refine_on_edge(branch_value);
        self.condition = ConditionKind::None;
        Ok(std::mem::take(&mut self.data))
    }
}
