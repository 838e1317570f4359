/*
 * Local Points-to Analysis
 *
 * Flow-insensitive, allocation-site based points-to over one procedure arena.
 *
 * Algorithm:
 * 1. Evaluate every operation in arena order, joining into per-operation values
 * 2. Assignments (and out/ref arguments) widen the target local, parameter or
 *    `this.field` cell
 * 3. Repeat until no value changes (values only grow, so this terminates)
 * 4. Derive escape sets: field stores, stores into ref/out parameters,
 *    returns, ref arguments, closure captures
 *
 * Locations:
 * - `new T()`, call results and out arguments: one allocation per operation
 * - parameters: one location per index
 * - `this.f`: the field's default location plus whatever is stored into it
 */

use crate::features::flow_graph::{OperationId, OperationKind, Procedure, RefKind};
use crate::features::points_to::domain::{
    AbstractLocation, CreationSite, LocationSet, NullAbstractValue, PointsToValue,
};
use crate::features::points_to::ports::PointsToOracle;
use crate::shared::models::{FieldId, LocalId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct LocalPointsToAnalysis {
    values: Vec<PointsToValue>,
    escaped: Vec<LocationSet>,
    parameters: Vec<PointsToValue>,
}

impl LocalPointsToAnalysis {
    /// Analyze `procedure`
    pub fn analyze(procedure: &Procedure) -> Self {
        let parameters: Vec<PointsToValue> = procedure
            .parameters
            .iter()
            .enumerate()
            .map(|(index, p)| {
                PointsToValue::single(
                    AbstractLocation::parameter(procedure.id, index as u32, Some(p.ty)),
                    NullAbstractValue::MaybeNull,
                )
            })
            .collect();

        let mut solver = Solver {
            procedure,
            values: vec![PointsToValue::undefined(); procedure.len()],
            locals: FxHashMap::default(),
            fields: FxHashMap::default(),
            parameter_cells: FxHashMap::default(),
            parameters: &parameters,
        };
        let mut passes = 0usize;
        while solver.pass() {
            passes += 1;
        }
        tracing::trace!(procedure = %procedure.name, passes, "Local points-to converged");

        let escaped = solver.escapes();
        Self {
            values: solver.values,
            escaped,
            parameters,
        }
    }
}

impl PointsToOracle for LocalPointsToAnalysis {
    fn points_to(&self, operation: OperationId) -> PointsToValue {
        self.values
            .get(operation.index())
            .cloned()
            .unwrap_or_else(PointsToValue::undefined)
    }

    fn escaped_locations(&self, operation: OperationId) -> LocationSet {
        self.escaped
            .get(operation.index())
            .cloned()
            .unwrap_or_default()
    }

    fn parameter_points_to(&self, index: u32) -> PointsToValue {
        self.parameters
            .get(index as usize)
            .cloned()
            .unwrap_or_else(PointsToValue::unknown)
    }
}

struct Solver<'a> {
    procedure: &'a Procedure,
    values: Vec<PointsToValue>,
    locals: FxHashMap<LocalId, PointsToValue>,
    fields: FxHashMap<FieldId, PointsToValue>,
    parameter_cells: FxHashMap<u32, PointsToValue>,
    parameters: &'a [PointsToValue],
}

impl<'a> Solver<'a> {
    fn site(&self, operation: OperationId) -> CreationSite {
        CreationSite::new(self.procedure.id, operation)
    }

    fn value(&self, operation: OperationId) -> PointsToValue {
        self.values
            .get(operation.index())
            .cloned()
            .unwrap_or_default()
    }

    fn is_this(&self, operation: Option<OperationId>) -> bool {
        operation
            .and_then(|id| self.procedure.operation(id))
            .map_or(false, |op| matches!(op.kind, OperationKind::InstanceReference))
    }

    /// One pass over the arena; returns whether anything changed
    fn pass(&mut self) -> bool {
        let procedure = self.procedure;
        let mut changed = false;
        for op in &procedure.operations {
            let value = self.evaluate(op.id);
            let joined = self.values[op.id.index()].union(&value);
            if joined != self.values[op.id.index()] {
                self.values[op.id.index()] = joined;
                changed = true;
            }
            changed |= self.apply_store(op.id);
        }
        changed
    }

    fn evaluate(&self, id: OperationId) -> PointsToValue {
        let Some(op) = self.procedure.operation(id) else {
            return PointsToValue::undefined();
        };
        match &op.kind {
            OperationKind::ObjectCreation { .. } => PointsToValue::single(
                AbstractLocation::allocation(self.site(id), op.ty),
                NullAbstractValue::NotNull,
            ),
            OperationKind::Invocation { .. } => match op.ty {
                Some(ty) => PointsToValue::single(
                    AbstractLocation::allocation(self.site(id), Some(ty)),
                    NullAbstractValue::MaybeNull,
                ),
                None => PointsToValue::undefined(),
            },
            OperationKind::Argument {
                ref_kind: RefKind::Out,
                ..
            } => PointsToValue::single(
                AbstractLocation::allocation(self.site(id), op.ty),
                NullAbstractValue::MaybeNull,
            ),
            OperationKind::Argument { value, .. }
            | OperationKind::Assignment { value, .. }
            | OperationKind::Conversion { operand: value } => self.value(*value),
            OperationKind::LocalReference { local } => {
                self.locals.get(local).cloned().unwrap_or_default()
            }
            OperationKind::ParameterReference { index } => {
                let entry = self
                    .parameters
                    .get(*index as usize)
                    .cloned()
                    .unwrap_or_else(PointsToValue::unknown);
                match self.parameter_cells.get(index) {
                    Some(stored) => entry.union(stored),
                    None => entry,
                }
            }
            OperationKind::FieldReference { field, instance } => {
                if self.is_this(*instance) {
                    let default = PointsToValue::single(
                        AbstractLocation::field_default(*field, op.ty),
                        NullAbstractValue::MaybeNull,
                    );
                    match self.fields.get(field) {
                        Some(stored) => default.union(stored),
                        None => default,
                    }
                } else {
                    PointsToValue::unknown()
                }
            }
            OperationKind::InstanceReference | OperationKind::Literal => {
                PointsToValue::known(LocationSet::new(), NullAbstractValue::NotNull)
            }
            OperationKind::NullLiteral => PointsToValue::null(),
            OperationKind::BinaryOperator { .. }
            | OperationKind::IsNull { .. }
            | OperationKind::Return { .. }
            | OperationKind::Throw { .. }
            | OperationKind::DelegateCreation { .. }
            | OperationKind::Other { .. } => PointsToValue::undefined(),
        }
    }

    /// Widen the cell written by `id`; returns whether it grew
    fn apply_store(&mut self, id: OperationId) -> bool {
        let Some(op) = self.procedure.operation(id) else {
            return false;
        };
        let (target, stored) = match &op.kind {
            OperationKind::Assignment { target, value } => (*target, self.value(*value)),
            OperationKind::Argument {
                ref_kind: RefKind::Out | RefKind::Ref,
                value,
                ..
            } => (*value, self.value(id)),
            _ => return false,
        };
        let Some(target_op) = self.procedure.operation(target) else {
            return false;
        };
        match &target_op.kind {
            OperationKind::LocalReference { local } => {
                widen(self.locals.entry(*local).or_default(), &stored)
            }
            OperationKind::FieldReference { field, instance } if self.is_this(*instance) => {
                widen(self.fields.entry(*field).or_default(), &stored)
            }
            OperationKind::ParameterReference { index } => {
                widen(self.parameter_cells.entry(*index).or_default(), &stored)
            }
            _ => false,
        }
    }

    /// Stores into fields and ref/out parameters are visible to callers
    fn leaves_procedure(&self, target: OperationId) -> bool {
        let Some(op) = self.procedure.operation(target) else {
            return false;
        };
        match op.kind {
            OperationKind::FieldReference { .. } => true,
            OperationKind::ParameterReference { index } => self
                .procedure
                .parameters
                .get(index as usize)
                .map_or(false, |p| p.ref_kind != RefKind::None),
            _ => false,
        }
    }

    fn escapes(&self) -> Vec<LocationSet> {
        let mut escaped = vec![LocationSet::new(); self.procedure.len()];
        for op in &self.procedure.operations {
            let set = match &op.kind {
                OperationKind::Assignment { target, value } => {
                    if self.leaves_procedure(*target) {
                        self.value(*value).locations
                    } else {
                        continue;
                    }
                }
                OperationKind::Return { value: Some(value) } => self.value(*value).locations,
                OperationKind::Argument {
                    ref_kind: RefKind::Ref,
                    value,
                    ..
                } => {
                    let own = AbstractLocation::allocation(self.site(op.id), op.ty);
                    let mut locations = self.value(*value).locations;
                    locations.remove(&own);
                    locations
                }
                OperationKind::DelegateCreation { captures, .. } => captures
                    .iter()
                    .filter_map(|local| self.locals.get(local))
                    .flat_map(|v| v.locations.iter().copied())
                    .collect::<LocationSet>(),
                _ => continue,
            };
            escaped[op.id.index()] = set.into_iter().filter(|l| !l.is_null()).collect();
        }
        escaped
    }
}

fn widen(cell: &mut PointsToValue, stored: &PointsToValue) -> bool {
    let joined = cell.union(stored);
    if joined != *cell {
        *cell = joined;
        true
    } else {
        false
    }
}
