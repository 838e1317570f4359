//! Null classification of a points-to value

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullAbstractValue {
    /// No information yet
    Undefined,
    Null,
    NotNull,
    MaybeNull,
}

impl NullAbstractValue {
    pub fn merge(self, other: Self) -> Self {
        use NullAbstractValue::*;
        match (self, other) {
            (Undefined, v) | (v, Undefined) => v,
            (a, b) if a == b => a,
            _ => MaybeNull,
        }
    }
}

impl Default for NullAbstractValue {
    fn default() -> Self {
        NullAbstractValue::Undefined
    }
}
