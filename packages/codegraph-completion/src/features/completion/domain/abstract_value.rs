//! Completion abstract value
//!
//! `{ kind, evidence }` where evidence is the set of completion / escape
//! operations that produced the kind. Values are immutable; the only ways to
//! derive a new one are the kind constructors and `with_new_completion` /
//! `with_new_escape`.

use super::value_kind::CompletionValueKind;
use crate::features::flow_graph::OperationSite;
use std::fmt;

/// Persistent set of evidence operations
pub type EvidenceSet = im::OrdSet<OperationSite>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionAbstractValue {
    kind: CompletionValueKind,
    evidence: EvidenceSet,
}

impl CompletionAbstractValue {
    fn new(evidence: EvidenceSet, kind: CompletionValueKind) -> Self {
        debug_assert!(
            kind.has_empty_evidence() == evidence.is_empty(),
            "{} with {} evidence operations",
            kind,
            evidence.len()
        );
        Self { kind, evidence }
    }

    fn empty(kind: CompletionValueKind) -> Self {
        Self {
            kind,
            evidence: EvidenceSet::new(),
        }
    }

    pub fn non_target() -> Self {
        Self::empty(CompletionValueKind::NonTarget)
    }

    pub fn invalid() -> Self {
        Self::empty(CompletionValueKind::Invalid)
    }

    pub fn not_completed() -> Self {
        Self::empty(CompletionValueKind::NotCompleted)
    }

    pub fn unknown() -> Self {
        Self::empty(CompletionValueKind::Unknown)
    }

    /// Value with explicit evidence (used by the merge)
    pub(crate) fn with_evidence(evidence: EvidenceSet, kind: CompletionValueKind) -> Self {
        Self::new(evidence, kind)
    }

    #[inline]
    pub fn kind(&self) -> CompletionValueKind {
        self.kind
    }

    #[inline]
    pub fn evidence(&self) -> &EvidenceSet {
        &self.evidence
    }

    /// Completion observed at `operation`; evidence accumulates
    pub fn with_new_completion(&self, operation: OperationSite) -> Self {
        debug_assert_ne!(self.kind, CompletionValueKind::NonTarget);
        Self::new(
            self.evidence.update(operation),
            CompletionValueKind::Completed,
        )
    }

    /// Escape observed at `operation`; evidence restarts at `{operation}`
    pub fn with_new_escape(&self, operation: OperationSite) -> Self {
        debug_assert_ne!(self.kind, CompletionValueKind::NonTarget);
        debug_assert_ne!(self.kind, CompletionValueKind::Unknown);
        Self::new(EvidenceSet::unit(operation), CompletionValueKind::Escaped)
    }
}

impl fmt::Display for CompletionAbstractValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.evidence.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            let ops: Vec<String> = self.evidence.iter().map(|op| op.to_string()).collect();
            write!(f, "{}{{{}}}", self.kind, ops.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::flow_graph::OperationId;
    use crate::shared::models::ProcedureId;

    fn site(op: u32) -> OperationSite {
        OperationSite::new(ProcedureId(0), OperationId(op))
    }

    #[test]
    fn test_completion_accumulates_evidence() {
        let value = CompletionAbstractValue::not_completed()
            .with_new_completion(site(1))
            .with_new_completion(site(2));
        assert_eq!(value.kind(), CompletionValueKind::Completed);
        assert_eq!(value.evidence().len(), 2);
    }

    #[test]
    fn test_escape_replaces_evidence() {
        let value = CompletionAbstractValue::not_completed()
            .with_new_completion(site(1))
            .with_new_escape(site(5));
        assert_eq!(value.kind(), CompletionValueKind::Escaped);
        assert_eq!(value.evidence(), &EvidenceSet::unit(site(5)));
    }

    #[test]
    fn test_display() {
        assert_eq!(CompletionAbstractValue::not_completed().to_string(), "NotCompleted");
        let value = CompletionAbstractValue::invalid().with_new_completion(site(3));
        assert_eq!(value.to_string(), "Completed{proc#0:op#3}");
    }
}
