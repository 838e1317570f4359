//! Completion infrastructure: reference host adapters, caches, built-in rules

mod built_in;
mod procedure_registry;
mod reported_locations;
mod resolution_cache;
mod symbol_table;

pub use built_in::TransactionScopeRule;
pub use procedure_registry::ProcedureRegistry;
pub use reported_locations::ReportedLocations;
pub use resolution_cache::{ResolutionCache, ResolvedTarget};
pub use symbol_table::SymbolTable;
