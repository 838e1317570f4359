//! Completion state of one abstract location

use serde::{Deserialize, Serialize};

/// Kinds in lattice order
///
/// `NonTarget < Invalid < NotCompleted < Escaped < NotCompletedOrEscaped
///  < Completed < MaybeCompleted < Unknown`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CompletionValueKind {
    /// Not an instance of the target type
    NonTarget,

    /// Path on which the location is known to be null
    Invalid,

    /// Created, completion not called
    NotCompleted,

    /// Ownership left the procedure
    Escaped,

    /// Not completed on some paths, escaped on others
    NotCompletedOrEscaped,

    /// Completion called (or escaped) on every path
    Completed,

    /// Completed on some paths only
    MaybeCompleted,

    /// No information (budget exhausted, unanalyzable callee)
    Unknown,
}

impl CompletionValueKind {
    /// Kinds whose value carries no evidence operations
    pub fn has_empty_evidence(self) -> bool {
        matches!(
            self,
            Self::NonTarget | Self::Invalid | Self::NotCompleted | Self::Unknown
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonTarget => "NonTarget",
            Self::Invalid => "Invalid",
            Self::NotCompleted => "NotCompleted",
            Self::Escaped => "Escaped",
            Self::NotCompletedOrEscaped => "NotCompletedOrEscaped",
            Self::Completed => "Completed",
            Self::MaybeCompleted => "MaybeCompleted",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for CompletionValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
