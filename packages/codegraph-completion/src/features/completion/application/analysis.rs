/*
 * Completion Analysis Driver
 *
 * Runs the completion transfer function over one procedure's CFG to a
 * fixpoint and packages the per-block states.
 */

use super::context::CompletionAnalysisContext;
use super::result::CompletionAnalysisResult;
use super::visitor::CompletionVisitor;
use crate::errors::{CompletionError, Result};
use crate::features::completion::ports::SymbolResolver;
use crate::features::dataflow::DataflowEngine;
use crate::features::flow_graph::{OperationKind, Procedure, RefKind};
use crate::shared::models::TypeId;
use std::time::Instant;

/// Analyze `context.procedure`
///
/// Callee contexts reach this recursively through the visitor.
pub fn run_completion_analysis(
    context: &CompletionAnalysisContext<'_>,
) -> Result<CompletionAnalysisResult> {
    let procedure = context.procedure;
    if procedure.cfg.blocks.is_empty() {
        return Err(CompletionError::CfgUnavailable(procedure.name.clone()));
    }

    let start = Instant::now();
    let engine = DataflowEngine::new(context.config.max_iterations);
    let mut visitor = CompletionVisitor::new(context);
    let output = engine.run(
        &procedure.name,
        &procedure.cfg,
        &mut visitor,
        context.cancellation,
    )?;
    let (tracked_instance_fields, mut stats) = visitor.finish();

    stats.iterations = output.iterations;
    stats.blocks = procedure.cfg.blocks.len();
    stats.tracked_locations = output.exit_output().map_or(0, |data| data.len());
    stats.non_monotonic_updates += output.non_monotonic_updates;
    stats.analysis_time_ms = start.elapsed().as_millis() as u64;

    tracing::debug!(
        procedure = %procedure.name,
        depth = context.depth,
        iterations = stats.iterations,
        tracked_locations = stats.tracked_locations,
        interprocedural_calls = stats.interprocedural_calls,
        "Completion analysis finished"
    );

    Ok(CompletionAnalysisResult {
        procedure: procedure.id,
        blocks: output.blocks,
        exit: output.exit,
        tracked_instance_fields,
        stats,
    })
}

/// Cheap pre-filter: can this body create a target instance at all?
///
/// Constructors always pass (their parameters may be owned).
pub fn has_any_target_creation_descendant(
    procedure: &Procedure,
    symbols: &dyn SymbolResolver,
    target_type: TypeId,
) -> bool {
    if procedure.is_constructor {
        return true;
    }
    let is_target = |ty: Option<TypeId>| ty.map_or(false, |ty| symbols.is_target(ty, target_type));
    procedure.operations.iter().any(|op| match op.kind {
        OperationKind::ObjectCreation { .. } | OperationKind::Invocation { .. } => is_target(op.ty),
        OperationKind::Argument {
            ref_kind: RefKind::Out,
            ..
        } => is_target(op.ty),
        _ => false,
    })
}
