/*
 * Finding Computation
 *
 * Classifies the exit state of every allocation created in the analyzed
 * procedure:
 * - Definite: NotCompleted, or completed/escaped only inside catch handlers
 * - Maybe: MaybeCompleted / NotCompletedOrEscaped (when enabled)
 *
 * Definite findings come first, each group ordered by location.
 */

use super::result::CompletionAnalysisResult;
use crate::features::completion::domain::{
    CompletionAbstractValue, CompletionAnalysisKind, CompletionFinding, CompletionValueKind,
    FindingSeverity,
};
use crate::features::flow_graph::{OperationSite, Procedure};
use crate::features::points_to::AbstractLocation;
use crate::shared::models::SourceLocation;

pub fn compute_findings(
    procedure: &Procedure,
    result: &CompletionAnalysisResult,
    rule_id: &str,
    analysis_kind: CompletionAnalysisKind,
) -> Vec<CompletionFinding> {
    let Some(exit) = result.exit_data() else {
        tracing::trace!(procedure = %procedure.name, "Exit unreachable on normal paths");
        return Vec::new();
    };

    let mut definite = Vec::new();
    let mut maybe = Vec::new();
    for (location, value) in exit.iter() {
        let Some(severity) = classify(procedure, location, value, analysis_kind) else {
            continue;
        };
        let Some(finding) = finding_at(procedure, location, value, rule_id, severity) else {
            continue;
        };
        match severity {
            FindingSeverity::Definite => definite.push(finding),
            FindingSeverity::Maybe => maybe.push(finding),
        }
    }

    definite.sort_by(|a, b| a.location.cmp(&b.location));
    maybe.sort_by(|a, b| a.location.cmp(&b.location));
    definite.extend(maybe);
    definite
}

/// Allocation created in `procedure` (parameters and field defaults never are)
fn local_creation(procedure: &Procedure, location: &AbstractLocation) -> Option<OperationSite> {
    location
        .creation()
        .filter(|site| site.procedure == procedure.id)
}

fn classify(
    procedure: &Procedure,
    location: &AbstractLocation,
    value: &CompletionAbstractValue,
    analysis_kind: CompletionAnalysisKind,
) -> Option<FindingSeverity> {
    if value.kind() == CompletionValueKind::NonTarget {
        return None;
    }
    let creation = local_creation(procedure, location)?;

    if value.kind() == CompletionValueKind::NotCompleted
        || only_in_catch(procedure, creation, value)
    {
        return Some(FindingSeverity::Definite);
    }

    let partial = matches!(
        value.kind(),
        CompletionValueKind::MaybeCompleted | CompletionValueKind::NotCompletedOrEscaped
    );
    (partial && analysis_kind.are_maybe_violations_enabled()).then_some(FindingSeverity::Maybe)
}

/// Every completion / escape happened in a catch handler the creation is not in
fn only_in_catch(
    procedure: &Procedure,
    creation: OperationSite,
    value: &CompletionAbstractValue,
) -> bool {
    let evidence = value.evidence();
    !evidence.is_empty()
        && !procedure.is_inside_catch_region(creation.operation)
        && evidence.iter().all(|site| {
            site.procedure == procedure.id && procedure.is_inside_catch_region(site.operation)
        })
}

fn finding_at(
    procedure: &Procedure,
    location: &AbstractLocation,
    value: &CompletionAbstractValue,
    rule_id: &str,
    severity: FindingSeverity,
) -> Option<CompletionFinding> {
    let creation = local_creation(procedure, location)?;
    let syntax = procedure.operation(creation.operation)?.syntax.as_ref()?;
    Some(CompletionFinding {
        location: SourceLocation::new(procedure.file_path.clone(), syntax.span),
        snippet: syntax.first_line().to_string(),
        severity,
        rule_id: rule_id.to_string(),
        procedure: procedure.name.clone(),
        kind: value.kind(),
    })
}
