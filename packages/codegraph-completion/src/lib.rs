/*
 * Codegraph Completion - Completion-on-Normal-Path Analysis
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (ids, Span, SourceLocation)
 * - features/    : Vertical slices (flow_graph → points_to → dataflow → completion)
 * - config/      : Engine presets + per-rule analyzer options
 *
 * Performance:
 * - Persistent maps: per-block states share structure
 * - Rayon work-stealing across procedures
 */

#![allow(clippy::too_many_arguments)] // Analysis contexts bundle many borrowed services
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{CompletionConfig, CompletionOptions, MapOptionReader, OptionReader, Preset};
pub use errors::{CompletionError, Result};

pub use features::completion::{
    CompletionAnalysisKind, CompletionFinding, CompletionRule, CompletionSession,
    CompletionValueKind, FindingSeverity, ProcedureRegistry, SessionReport, SymbolTable,
    TransactionScopeRule,
};
pub use features::dataflow::CancellationToken;
pub use features::flow_graph::{Procedure, ProcedureBuilder};
pub use features::points_to::{LocalPointsToAnalysis, PointsToOracle};
