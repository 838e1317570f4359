/*
 * Completion Application Layer
 *
 * Transfer function, fixpoint driver, finding computation and the
 * session entry point.
 */

mod analysis;
mod context;
mod reporting;
mod result;
mod session;
mod visitor;

pub use analysis::{has_any_target_creation_descendant, run_completion_analysis};
pub use context::CompletionAnalysisContext;
pub use reporting::compute_findings;
pub use result::{AnalysisStats, CompletionAnalysisResult};
pub use session::{CompletionSession, ProcedureReport, SessionReport};
pub use visitor::CompletionVisitor;
