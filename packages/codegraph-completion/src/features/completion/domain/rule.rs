//! Rule descriptor: which type must be completed, and by which method

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionRule {
    /// Diagnostic id; also scopes analyzer options
    pub id: String,

    /// Fully qualified name of the target type
    pub target_type_full_name: String,

    /// Instance method that completes a target instance
    pub completion_method_name: String,
}

impl CompletionRule {
    pub fn new(
        id: impl Into<String>,
        target_type_full_name: impl Into<String>,
        completion_method_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            target_type_full_name: target_type_full_name.into(),
            completion_method_name: completion_method_name.into(),
        }
    }
}
