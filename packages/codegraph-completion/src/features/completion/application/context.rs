//! Analysis context
//!
//! Immutable bundle for one CFG traversal. Callee traversals fork a child
//! context that points back at its caller, so the call chain is walkable for
//! recursion checks and the depth budget.

use crate::config::{CompletionConfig, CompletionOptions};
use crate::features::completion::domain::CompletionAnalysisData;
use crate::features::completion::infrastructure::ResolvedTarget;
use crate::features::completion::ports::{CalleeBody, ProcedureProvider, SymbolResolver};
use crate::features::dataflow::CancellationToken;
use crate::features::flow_graph::Procedure;
use crate::features::points_to::PointsToOracle;
use crate::shared::models::MethodId;

pub struct CompletionAnalysisContext<'a> {
    pub procedure: &'a Procedure,
    pub points_to: &'a dyn PointsToOracle,
    pub symbols: &'a dyn SymbolResolver,
    pub procedures: &'a dyn ProcedureProvider,
    pub target: ResolvedTarget,
    pub options: CompletionOptions,
    pub config: &'a CompletionConfig,
    pub cancellation: &'a CancellationToken,

    /// Caller context (callee traversals only)
    pub parent: Option<&'a CompletionAnalysisContext<'a>>,

    /// Call-chain depth (0 for the analyzed procedure)
    pub depth: usize,

    /// Entry data seeded by the caller
    pub initial_data: Option<CompletionAnalysisData>,
}

impl<'a> CompletionAnalysisContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        procedure: &'a Procedure,
        points_to: &'a dyn PointsToOracle,
        symbols: &'a dyn SymbolResolver,
        procedures: &'a dyn ProcedureProvider,
        target: ResolvedTarget,
        options: CompletionOptions,
        config: &'a CompletionConfig,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            procedure,
            points_to,
            symbols,
            procedures,
            target,
            options,
            config,
            cancellation,
            parent: None,
            depth: 0,
            initial_data: None,
        }
    }

    /// Child context for a callee body
    pub fn for_callee<'b>(
        &'b self,
        callee: &'b CalleeBody,
        initial_data: CompletionAnalysisData,
    ) -> CompletionAnalysisContext<'b> {
        CompletionAnalysisContext {
            procedure: callee.procedure.as_ref(),
            points_to: callee.points_to.as_ref(),
            symbols: self.symbols,
            procedures: self.procedures,
            target: self.target,
            options: self.options,
            config: self.config,
            cancellation: self.cancellation,
            parent: Some(self),
            depth: self.depth + 1,
            initial_data: Some(initial_data),
        }
    }

    #[inline]
    pub fn is_callee(&self) -> bool {
        self.parent.is_some()
    }

    /// Whether `method` is being analyzed somewhere on the call chain
    pub fn is_on_call_chain(&self, method: MethodId) -> bool {
        let mut current = Some(self);
        while let Some(context) = current {
            if context.procedure.method == Some(method) {
                return true;
            }
            current = context.parent;
        }
        false
    }

    /// Another level of callee analysis fits the budget
    pub fn can_descend(&self) -> bool {
        self.config.interprocedural && self.depth < self.config.max_interprocedural_depth
    }
}
