//! Shared data models

pub mod ids;
pub mod span;

pub use ids::{CompilationId, FieldId, LocalId, MethodId, ProcedureId, TypeId};
pub use span::{SourceLocation, Span};
