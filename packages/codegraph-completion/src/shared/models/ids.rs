//! Symbol identifiers
//!
//! Hosts assign these; the engine only compares them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! symbol_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

symbol_id!(
    /// Type symbol
    TypeId,
    "type"
);
symbol_id!(
    /// Method symbol (constructors included)
    MethodId,
    "method"
);
symbol_id!(
    /// Field symbol
    FieldId,
    "field"
);
symbol_id!(
    /// Local variable within one procedure
    LocalId,
    "local"
);
symbol_id!(
    /// Analyzed procedure (method body, lambda, local function)
    ProcedureId,
    "proc"
);
symbol_id!(
    /// Compilation the symbols belong to
    CompilationId,
    "compilation"
);
