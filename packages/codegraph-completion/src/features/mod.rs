//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure models (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Reference implementations

pub mod flow_graph;

// Generic forward dataflow (lattice + fixpoint engine)
pub mod dataflow;

// Intraprocedural alias information consumed by the completion analysis
pub mod points_to;

pub mod completion;
