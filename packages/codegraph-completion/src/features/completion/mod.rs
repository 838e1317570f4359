/*
 * Completion on Normal Path
 *
 * Detects allocations of a target type whose completion method is not
 * called on every exception-free path, e.g. a `TransactionScope` disposed
 * without `Complete()`.
 *
 * Architecture:
 * - Domain: value kinds, completion lattice, rules, findings
 * - Application: CompletionVisitor (transfer), driver, reporting, session
 * - Infrastructure: symbol table, procedure registry, caches, built-in rules
 * - Ports: SymbolResolver, ProcedureProvider
 *
 * Algorithm:
 * - Forward dataflow over the CFG, one completion state per abstract location
 * - Points-to information maps operations to locations and escapes
 * - Callee bodies analyzed in child contexts up to a depth budget
 * - Exit states of local allocations classified as definite / maybe findings
 */

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{
    CompletionAbstractValue, CompletionAnalysisData, CompletionAnalysisDomain,
    CompletionAnalysisKind, CompletionFinding, CompletionRule, CompletionValueDomain,
    CompletionValueKind, FindingSeverity,
};

pub use application::{
    AnalysisStats, CompletionAnalysisContext, CompletionAnalysisResult, CompletionSession,
    ProcedureReport, SessionReport,
};

pub use infrastructure::{ProcedureRegistry, SymbolTable, TransactionScopeRule};

pub use ports::{CalleeBody, MethodSignature, ProcedureProvider, SymbolResolver, TypeKind};
