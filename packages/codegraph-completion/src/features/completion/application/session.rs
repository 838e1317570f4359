/*
 * Completion Session
 *
 * Entry point for one rule over one compilation. A session owns the state
 * shared by every procedure it analyzes:
 * - target resolution (resolved once per compilation)
 * - reported source locations (one finding per creation site)
 * - the cancellation token
 *
 * Procedures are independent; `analyze_all` fans out over rayon when the
 * `parallel` feature is enabled.
 *
 * # Usage
 * ```ignore
 * let session = CompletionSession::new(TransactionScopeRule::define(), &symbols, &registry)
 *     .with_config(CompletionConfig::from_preset(Preset::Fast));
 * let report = session.analyze_all(&procedures)?;
 * for finding in &report.findings {
 *     println!("{}", finding);
 * }
 * ```
 */

use super::analysis::{has_any_target_creation_descendant, run_completion_analysis};
use super::context::CompletionAnalysisContext;
use super::reporting::compute_findings;
use super::result::AnalysisStats;
use crate::config::{CompletionConfig, CompletionOptions, OptionReader};
use crate::errors::{CompletionError, Result};
use crate::features::completion::domain::{CompletionFinding, CompletionRule};
use crate::features::completion::infrastructure::{
    ReportedLocations, ResolutionCache, ResolvedTarget,
};
use crate::features::completion::ports::{ProcedureProvider, SymbolResolver};
use crate::features::dataflow::CancellationToken;
use crate::features::flow_graph::Procedure;
use crate::features::points_to::{LocalPointsToAnalysis, PointsToOracle};
use serde::Serialize;
use std::time::Instant;

/// Outcome for one procedure
#[derive(Debug, Clone, Serialize)]
pub struct ProcedureReport {
    pub procedure: String,

    /// Findings this procedure claimed (already deduplicated)
    pub findings: Vec<CompletionFinding>,

    /// `None` when the procedure was skipped
    pub stats: Option<AnalysisStats>,
}

impl ProcedureReport {
    fn skipped(procedure: &Procedure) -> Self {
        Self {
            procedure: procedure.name.clone(),
            findings: Vec::new(),
            stats: None,
        }
    }

    pub fn was_analyzed(&self) -> bool {
        self.stats.is_some()
    }
}

/// Outcome for a batch of procedures
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    /// Ordered by source location
    pub findings: Vec<CompletionFinding>,
    pub procedures_analyzed: usize,
    pub procedures_skipped: usize,
    pub interprocedural_calls: usize,
    pub analysis_time_ms: u64,
}

impl SessionReport {
    fn absorb(&mut self, report: ProcedureReport) {
        match &report.stats {
            Some(stats) => {
                self.procedures_analyzed += 1;
                self.interprocedural_calls += stats.interprocedural_calls;
            }
            None => self.procedures_skipped += 1,
        }
        self.findings.extend(report.findings);
    }

    pub fn definite_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_definite()).count()
    }
}

pub struct CompletionSession<'s> {
    rule: CompletionRule,
    symbols: &'s dyn SymbolResolver,
    procedures: &'s dyn ProcedureProvider,
    config: CompletionConfig,
    options: CompletionOptions,
    resolution: ResolutionCache,
    reported: ReportedLocations,
    cancellation: CancellationToken,
}

impl<'s> CompletionSession<'s> {
    pub fn new(
        rule: CompletionRule,
        symbols: &'s dyn SymbolResolver,
        procedures: &'s dyn ProcedureProvider,
    ) -> Self {
        Self {
            rule,
            symbols,
            procedures,
            config: CompletionConfig::default(),
            options: CompletionOptions::default(),
            resolution: ResolutionCache::new(),
            reported: ReportedLocations::new(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Read the rule's options from analyzer configuration
    pub fn with_options(mut self, reader: &dyn OptionReader) -> Self {
        self.options = CompletionOptions::read(reader, &self.rule.id);
        self
    }

    pub fn with_completion_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn rule(&self) -> &CompletionRule {
        &self.rule
    }

    pub fn options(&self) -> CompletionOptions {
        self.options
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Resolve the rule's target in this session's compilation
    pub fn resolve_target(&self) -> Result<ResolvedTarget> {
        self.resolution
            .get_or_resolve(self.symbols, &self.rule)
            .ok_or_else(|| CompletionError::TargetNotResolved {
                target_type: self.rule.target_type_full_name.clone(),
                method: self.rule.completion_method_name.clone(),
            })
    }

    /// Analyze one procedure with the host's alias information
    ///
    /// Soft failures (unresolved target, missing CFG, no convergence) yield
    /// a skipped report; cancellation and malformed graphs are errors.
    pub fn analyze_procedure(
        &self,
        procedure: &Procedure,
        points_to: &dyn PointsToOracle,
    ) -> Result<ProcedureReport> {
        self.cancellation.check()?;

        let target = match self.resolve_target() {
            Ok(target) => target,
            Err(err) => return skip_on_soft_error(procedure, err),
        };
        if !has_any_target_creation_descendant(procedure, self.symbols, target.target_type) {
            tracing::trace!(procedure = %procedure.name, "No target creation; skipping");
            return Ok(ProcedureReport::skipped(procedure));
        }

        let context = CompletionAnalysisContext::new(
            procedure,
            points_to,
            self.symbols,
            self.procedures,
            target,
            self.options,
            &self.config,
            &self.cancellation,
        );
        let result = match run_completion_analysis(&context) {
            Ok(result) => result,
            Err(err) => return skip_on_soft_error(procedure, err),
        };

        let findings: Vec<CompletionFinding> =
            compute_findings(procedure, &result, &self.rule.id, self.options.analysis_kind)
                .into_iter()
                .filter(|finding| self.reported.try_claim(&finding.location))
                .collect();
        if !findings.is_empty() {
            tracing::debug!(
                procedure = %procedure.name,
                rule = %self.rule.id,
                count = findings.len(),
                "Completion findings"
            );
        }

        Ok(ProcedureReport {
            procedure: procedure.name.clone(),
            findings,
            stats: Some(result.stats),
        })
    }

    /// Analyze one procedure with intraprocedural alias information
    pub fn analyze(&self, procedure: &Procedure) -> Result<ProcedureReport> {
        let points_to = LocalPointsToAnalysis::analyze(procedure);
        self.analyze_procedure(procedure, &points_to)
    }

    /// Analyze a batch of procedures
    pub fn analyze_all(&self, procedures: &[Procedure]) -> Result<SessionReport> {
        let start = Instant::now();

        #[cfg(feature = "parallel")]
        let reports: Vec<ProcedureReport> = {
            use rayon::prelude::*;
            procedures
                .par_iter()
                .map(|procedure| self.analyze(procedure))
                .collect::<Result<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let reports: Vec<ProcedureReport> = procedures
            .iter()
            .map(|procedure| self.analyze(procedure))
            .collect::<Result<Vec<_>>>()?;

        let mut report = SessionReport::default();
        for procedure_report in reports {
            report.absorb(procedure_report);
        }
        report.findings.sort_by(|a, b| a.location.cmp(&b.location));
        report.analysis_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            rule = %self.rule.id,
            analyzed = report.procedures_analyzed,
            skipped = report.procedures_skipped,
            findings = report.findings.len(),
            time_ms = report.analysis_time_ms,
            "Completion session finished"
        );
        Ok(report)
    }
}

fn skip_on_soft_error(procedure: &Procedure, err: CompletionError) -> Result<ProcedureReport> {
    if err.is_soft() {
        tracing::debug!(procedure = %procedure.name, error = %err, "Procedure skipped");
        Ok(ProcedureReport::skipped(procedure))
    } else {
        Err(err)
    }
}
