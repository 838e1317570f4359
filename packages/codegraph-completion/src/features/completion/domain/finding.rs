/*
 * Completion Findings
 *
 * One finding per allocation whose completion is not guaranteed at the
 * normal exit of its procedure.
 */

use super::value_kind::CompletionValueKind;
use crate::shared::models::SourceLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingSeverity {
    /// Never completed on some exception-free path
    Definite,

    /// Completed (or escaped) on some paths only
    Maybe,
}

impl std::fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingSeverity::Definite => write!(f, "not completed"),
            FindingSeverity::Maybe => write!(f, "may not be completed"),
        }
    }
}

/// Allocation reported at its creation site
///
/// # Example
/// ```ignore
/// let finding = CompletionFinding {
///     location: SourceLocation::new("Program.cs", Span::on_line(12, 8, 30)),
///     snippet: "var scope = new TransactionScope();".to_string(),
///     severity: FindingSeverity::Definite,
///     rule_id: "XA0001".to_string(),
///     procedure: "Program.Run".to_string(),
///     kind: CompletionValueKind::NotCompleted,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionFinding {
    /// Source location of the creation
    pub location: SourceLocation,

    /// First line of the creation's source text
    pub snippet: String,

    pub severity: FindingSeverity,

    pub rule_id: String,

    /// Procedure that owns the allocation
    pub procedure: String,

    /// Exit state that triggered the finding
    pub kind: CompletionValueKind,
}

impl CompletionFinding {
    pub fn is_definite(&self) -> bool {
        self.severity == FindingSeverity::Definite
    }

    /// Format for display
    pub fn format_message(&self) -> String {
        format!(
            "{}: {} [{}] '{}' {} on all normal paths (in {})",
            self.location, self.rule_id, self.kind, self.snippet, self.severity, self.procedure
        )
    }
}

impl std::fmt::Display for CompletionFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

/// Serialize findings as a pretty-printed JSON array
pub fn findings_to_json(findings: &[CompletionFinding]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(findings)
}
