/*
 * Completion Value Domain
 *
 * Lattice over `CompletionAbstractValue`.
 *
 * Merge precedence:
 * 1. Invalid on either side → the other value (a null path adds nothing)
 * 2. NonTarget on either side → NonTarget
 * 3. Unknown on either side → Unknown
 * 4. NotCompleted ⊔ NotCompleted → NotCompleted
 * 5. otherwise `merge_kinds`, evidence = union of both sides
 */

use super::abstract_value::CompletionAbstractValue;
use super::value_kind::CompletionValueKind;
use crate::features::dataflow::AbstractDomain;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionValueDomain;

impl CompletionValueDomain {
    fn compare_evidence(
        old: &CompletionAbstractValue,
        new: &CompletionAbstractValue,
        assert_monotonicity: bool,
    ) -> Ordering {
        if old.evidence() == new.evidence() {
            Ordering::Equal
        } else if old.evidence().is_subset(new.evidence()) {
            Ordering::Less
        } else {
            if assert_monotonicity {
                report_non_monotonic(old, new);
            }
            Ordering::Greater
        }
    }
}

fn report_non_monotonic(old: &CompletionAbstractValue, new: &CompletionAbstractValue) {
    tracing::warn!(old = %old, new = %new, "Non-monotonic completion value update");
}

/// Kind of `a ⊔ b` for the non-absorbing kinds
///
/// Returns `None` for pairs involving NonTarget, Invalid or Unknown (the
/// merge handles those before consulting this table) and for any pair the
/// table does not cover.
pub fn merge_kinds(a: CompletionValueKind, b: CompletionValueKind) -> Option<CompletionValueKind> {
    use CompletionValueKind::*;

    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    match (lo, hi) {
        (NonTarget | Invalid | Unknown, _) | (_, NonTarget | Invalid | Unknown) => None,
        (x, y) if x == y => Some(x),
        (_, MaybeCompleted) => Some(MaybeCompleted),
        (NotCompleted, Escaped) | (NotCompleted, NotCompletedOrEscaped) => {
            Some(NotCompletedOrEscaped)
        }
        (NotCompleted, Completed) => Some(MaybeCompleted),
        (Escaped, NotCompletedOrEscaped) => Some(NotCompletedOrEscaped),
        (Escaped, Completed) => Some(Completed),
        (NotCompletedOrEscaped, Completed) => Some(MaybeCompleted),
        _ => None,
    }
}

impl AbstractDomain for CompletionValueDomain {
    type Value = CompletionAbstractValue;

    fn bottom(&self) -> CompletionAbstractValue {
        CompletionAbstractValue::non_target()
    }

    fn unknown_or_maybe(&self) -> CompletionAbstractValue {
        CompletionAbstractValue::unknown()
    }

    fn compare(
        &self,
        old: &CompletionAbstractValue,
        new: &CompletionAbstractValue,
        assert_monotonicity: bool,
    ) -> Ordering {
        if old == new {
            return Ordering::Equal;
        }
        if old.kind() == new.kind() {
            return Self::compare_evidence(old, new, assert_monotonicity);
        }
        if old.kind() < new.kind()
            || matches!(
                new.kind(),
                CompletionValueKind::Invalid | CompletionValueKind::Completed
            )
        {
            return Ordering::Less;
        }
        if assert_monotonicity {
            report_non_monotonic(old, new);
        }
        Ordering::Greater
    }

    fn merge(
        &self,
        a: &CompletionAbstractValue,
        b: &CompletionAbstractValue,
    ) -> CompletionAbstractValue {
        use CompletionValueKind::*;

        if a.kind() == Invalid {
            return b.clone();
        }
        if b.kind() == Invalid {
            return a.clone();
        }
        if a.kind() == NonTarget || b.kind() == NonTarget {
            return CompletionAbstractValue::non_target();
        }
        if a.kind() == Unknown || b.kind() == Unknown {
            return CompletionAbstractValue::unknown();
        }
        if a.kind() == NotCompleted && b.kind() == NotCompleted {
            return CompletionAbstractValue::not_completed();
        }

        let kind = merge_kinds(a.kind(), b.kind()).unwrap_or_else(|| {
            tracing::error!(left = %a, right = %b, "Unhandled completion kind pair");
            debug_assert!(false, "unhandled completion kind pair {} / {}", a.kind(), b.kind());
            MaybeCompleted
        });
        let evidence = a.evidence().clone().union(b.evidence().clone());
        CompletionAbstractValue::with_evidence(evidence, kind)
    }
}
