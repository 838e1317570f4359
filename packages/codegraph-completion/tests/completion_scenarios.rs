//! Completion-on-normal-path scenarios
//!
//! Each test lowers a small C# method into operations + CFG and checks the
//! findings a session reports for it.

mod common;

use codegraph_completion::config::{
    CompletionConfig, CompletionOptions, MapOptionReader, Preset,
    OPTION_OWNERSHIP_TRANSFER_AT_METHOD_CALL,
};
use codegraph_completion::features::completion::application::{
    run_completion_analysis, CompletionAnalysisContext,
};
use codegraph_completion::features::completion::domain::findings_to_json;
use codegraph_completion::features::completion::infrastructure::ResolvedTarget;
use codegraph_completion::features::completion::{
    CompletionAnalysisKind, CompletionSession, CompletionValueKind, FindingSeverity,
    ProcedureRegistry, TransactionScopeRule,
};
use codegraph_completion::features::dataflow::CancellationToken;
use codegraph_completion::features::flow_graph::{
    BinaryOperatorKind, OperationSite, ProcedureBuilder, RefKind, RegionKind, SyntaxRef,
};
use codegraph_completion::features::points_to::{AbstractLocation, LocalPointsToAnalysis};
use codegraph_completion::shared::models::{FieldId, ProcedureId};
use codegraph_completion::CompletionError;
use common::{straight_line, World, FILE};
use pretty_assertions::assert_eq;

// ============================================================================
// Straight-line bodies
// ============================================================================

#[test]
fn test_empty_body_is_skipped() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Empty", |_| vec![]);

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(!report.was_analyzed());
    assert!(report.findings.is_empty());
}

#[test]
fn test_scope_never_completed_is_definite() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| {
        vec![world.new_scope(b, 0, 10)]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.severity, FindingSeverity::Definite);
    assert_eq!(finding.kind, CompletionValueKind::NotCompleted);
    assert_eq!(finding.snippet, "var scope = new TransactionScope();");
    assert_eq!(finding.location.file_path, FILE);
    assert_eq!(finding.location.span.start_line, 10);
    assert_eq!(finding.rule_id, TransactionScopeRule::ID);
}

#[test]
fn test_scope_completed_is_clean() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| {
        vec![world.new_scope(b, 0, 10), world.complete(b, 0)]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.was_analyzed());
    assert!(report.findings.is_empty());
}

#[test]
fn test_returned_scope_escapes() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Open", |b| {
        let create = world.new_scope(b, 0, 10);
        let value = world.read(b, 0);
        vec![create, b.ret(Some(value))]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
}

#[test]
fn test_static_factory_result_is_a_creation() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| {
        let call = b.invoke(world.create, None, vec![], Some(world.scope));
        b.with_syntax(call, SyntaxRef::at_line(4, "var scope = TransactionScope.Create();"));
        let target = world.read(b, 0);
        vec![b.assign(target, call)]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].snippet, "var scope = TransactionScope.Create();");
    assert!(report.findings[0].is_definite());
}

// ============================================================================
// Branches
// ============================================================================

/// `var scope = new TS(); if (flag) scope.Complete();`
fn completed_on_one_branch(world: &World) -> codegraph_completion::Procedure {
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Maybe").in_file(FILE);
    let then_block = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    let create = world.new_scope(&mut b, 0, 7);
    b.push(entry, create);
    let flag = b.literal(Some(world.boolean));
    b.branch(entry, flag, then_block, exit);

    let complete = world.complete(&mut b, 0);
    b.push(then_block, complete);
    b.goto(then_block, exit);
    b.build().unwrap()
}

#[test]
fn test_completed_on_one_branch_is_maybe() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = completed_on_one_branch(&world);

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].severity, FindingSeverity::Maybe);
    assert_eq!(report.findings[0].kind, CompletionValueKind::MaybeCompleted);
}

#[test]
fn test_maybe_findings_disabled_by_analysis_kind() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = completed_on_one_branch(&world);
    let options = CompletionOptions::default()
        .with_analysis_kind(CompletionAnalysisKind::NonExceptionPathsOnlyNotCompleted);

    let report = world.session_with(&registry, options).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
}

#[test]
fn test_completed_on_both_branches_is_clean() {
    // var scope = new TS(); if (flag) { scope.Complete(); } else { scope.Complete(); }
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Both").in_file(FILE);
    let then_block = b.block();
    let else_block = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    let create = world.new_scope(&mut b, 0, 3);
    b.push(entry, create);
    let flag = b.literal(Some(world.boolean));
    b.branch(entry, flag, then_block, else_block);

    for block in [then_block, else_block] {
        let complete = world.complete(&mut b, 0);
        b.push(block, complete);
        b.goto(block, exit);
    }
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.was_analyzed());
    assert!(report.findings.is_empty());
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_scope_completed_inside_loop_body_is_clean() {
    // while (flag) { var scope = new TS(); scope.Complete(); }
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Loop").in_file(FILE);
    let header = b.block();
    let body = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    b.goto(entry, header);
    let flag = b.literal(Some(world.boolean));
    b.branch(header, flag, body, exit);
    let create = world.new_scope(&mut b, 0, 4);
    b.push(body, create);
    let complete = world.complete(&mut b, 0);
    b.push(body, complete);
    b.goto(body, header);
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
    assert!(report.stats.unwrap().iterations >= 2);
}

#[test]
fn test_scope_completed_only_in_loop_is_maybe() {
    // var scope = new TS(); while (flag) scope.Complete();
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Loop").in_file(FILE);
    let header = b.block();
    let body = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    let create = world.new_scope(&mut b, 0, 3);
    b.push(entry, create);
    b.goto(entry, header);
    let flag = b.literal(Some(world.boolean));
    b.branch(header, flag, body, exit);
    let complete = world.complete(&mut b, 0);
    b.push(body, complete);
    b.goto(body, header);
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].severity, FindingSeverity::Maybe);
    assert_eq!(report.findings[0].kind, CompletionValueKind::MaybeCompleted);
    assert_eq!(report.findings[0].location.span.start_line, 3);
}

#[test]
fn test_null_check_invalidates_null_path() {
    // var scope = new TS(); if (scope == null) return; scope.Complete();
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Guarded").in_file(FILE);
    let body = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    let create = world.new_scope(&mut b, 0, 3);
    b.push(entry, create);
    let read = world.read(&mut b, 0);
    let null = b.null();
    let test = b.binary(BinaryOperatorKind::Equals, read, null, Some(world.boolean));
    b.branch(entry, test, exit, body);

    let complete = world.complete(&mut b, 0);
    b.push(body, complete);
    b.goto(body, exit);
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
}

#[test]
fn test_null_on_left_of_inequality() {
    // if (null != scope) scope.Complete();
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Guarded").in_file(FILE);
    let body = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    let create = world.new_scope(&mut b, 0, 3);
    b.push(entry, create);
    let null = b.null();
    let read = world.read(&mut b, 0);
    let test = b.binary(BinaryOperatorKind::NotEquals, null, read, Some(world.boolean));
    b.branch(entry, test, body, exit);

    let complete = world.complete(&mut b, 0);
    b.push(body, complete);
    b.goto(body, exit);
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
}

#[test]
fn test_completed_only_in_catch_is_definite() {
    // var scope = new TS(); try { ... } catch { scope.Complete(); }
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Handler").in_file(FILE);
    let try_block = b.block();
    let handler = b.block();
    let (entry, exit) = (b.entry(), b.exit());
    let try_region = b.region(RegionKind::Try, None);
    let catch_region = b.region(RegionKind::Catch, None);
    b.set_region(try_block, try_region);
    b.set_region(handler, catch_region);

    let create = world.new_scope(&mut b, 0, 2);
    b.push(entry, create);
    b.goto(entry, try_block);
    b.goto(try_block, exit);
    b.goto(try_block, handler);
    let complete = world.complete(&mut b, 0);
    b.push(handler, complete);
    b.goto(handler, exit);
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert!(report.findings[0].is_definite());
    assert_eq!(report.findings[0].kind, CompletionValueKind::MaybeCompleted);
}

// ============================================================================
// Out arguments
// ============================================================================

#[test]
fn test_out_argument_creates_instance() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Fetch", |b| {
        vec![world.try_get(b, 0, 5)]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].snippet, "TryGet(out var scope)");
    assert!(report.findings[0].is_definite());
}

#[test]
fn test_try_get_false_path_creates_nothing() {
    // if (!TryGet(out var scope)) return; scope.Complete();
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Fetch").in_file(FILE);
    let body = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    let call = world.try_get(&mut b, 0, 5);
    b.branch(entry, call, body, exit);
    let complete = world.complete(&mut b, 0);
    b.push(body, complete);
    b.goto(body, exit);
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
}

#[test]
fn test_try_get_by_ref_hands_back_owned_instance() {
    // var scope = new TS(); scope.Complete(); TryGetScope(ref scope);
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Swap", |b| {
        vec![
            world.new_scope(b, 0, 10),
            world.complete(b, 0),
            world.pass_by_ref(b, world.try_get_ref, 0),
        ]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, CompletionValueKind::NotCompleted);
    assert_eq!(report.findings[0].location.span.start_line, 10);
}

#[test]
fn test_other_by_ref_call_loses_state() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Swap", |b| {
        vec![world.new_scope(b, 0, 10), world.pass_by_ref(b, world.refresh, 0)]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.was_analyzed());
    assert!(report.findings.is_empty());
}

// ============================================================================
// Ownership transfer
// ============================================================================

#[test]
fn test_passing_to_unknown_method_keeps_ownership() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| {
        vec![world.new_scope(b, 0, 10), world.pass(b, world.consume, 0)]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert!(report.findings[0].is_definite());
}

#[test]
fn test_ownership_transfer_at_method_call() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| {
        vec![world.new_scope(b, 0, 10), world.pass(b, world.consume, 0)]
    });
    let options = CompletionOptions::default().with_ownership_transfer_at_method_call(true);

    let report = world.session_with(&registry, options).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
}

#[test]
fn test_ownership_transfer_read_from_options() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| {
        vec![world.new_scope(b, 0, 10), world.pass(b, world.consume, 0)]
    });
    let reader = MapOptionReader::new().with(OPTION_OWNERSHIP_TRANSFER_AT_METHOD_CALL, "true");

    let session = world.session(&registry).with_options(&reader);

    assert!(session.options().ownership_transfer_at_method_call);
    assert!(session.analyze(&procedure).unwrap().findings.is_empty());
}

#[test]
fn test_ownership_transfer_at_constructor() {
    // var scope = new TS(); var wrapper = new Wrapper(scope);
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Wrap", |b| {
        let create = world.new_scope(b, 0, 10);
        let value = world.read(b, 0);
        let argument = b.argument(0, RefKind::None, Some(world.scope), value);
        let wrap = b.new_object(
            world.wrapper_ctor,
            world.wrapper,
            vec![argument],
            SyntaxRef::at_line(11, "var wrapper = new Wrapper(scope);"),
        );
        vec![create, wrap]
    });

    let keep = world.session(&registry).analyze(&procedure).unwrap();
    assert_eq!(keep.findings.len(), 1);

    let options = CompletionOptions::default().with_ownership_transfer_at_constructor(true);
    let transfer = world.session_with(&registry, options).analyze(&procedure).unwrap();
    assert!(transfer.findings.is_empty());
}

// ============================================================================
// Interprocedural
// ============================================================================

fn run_and_finish(world: &World) -> codegraph_completion::Procedure {
    straight_line(ProcedureId(1), "Program.Run", |b| {
        vec![world.new_scope(b, 0, 10), world.pass(b, world.finish, 0)]
    })
}

#[test]
fn test_completion_in_callee_is_seen() {
    let world = World::new();
    let mut registry = ProcedureRegistry::new();
    registry.register(world.finish_body(ProcedureId(2)));
    let procedure = run_and_finish(&world);

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert!(report.findings.is_empty());
    assert_eq!(report.stats.as_ref().unwrap().interprocedural_calls, 1);
}

#[test]
fn test_intraprocedural_mode_ignores_callee_body() {
    let world = World::new();
    let mut registry = ProcedureRegistry::new();
    registry.register(world.finish_body(ProcedureId(2)));
    let procedure = run_and_finish(&world);

    let report = world.fast_session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.stats.as_ref().unwrap().interprocedural_calls, 0);
}

#[test]
fn test_depth_budget_degrades_call() {
    let world = World::new();
    let mut registry = ProcedureRegistry::new();
    registry.register(world.finish_body(ProcedureId(2)));
    let procedure = run_and_finish(&world);
    let config = CompletionConfig::from_preset(Preset::Balanced).with_max_interprocedural_depth(0);

    let report = world
        .session(&registry)
        .with_config(config)
        .analyze(&procedure)
        .unwrap();

    assert_eq!(report.findings.len(), 1);
    let stats = report.stats.unwrap();
    assert_eq!(stats.interprocedural_calls, 0);
    assert_eq!(stats.degraded_calls, 1);
}

#[test]
fn test_call_in_branch_condition_counted_once() {
    // var scope = new TS(); if (Check(scope)) scope.Complete();
    let world = World::new();
    let mut registry = ProcedureRegistry::new();
    registry.register(world.empty_body(ProcedureId(2), "Program.Check", world.check, RefKind::None));
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Run").in_file(FILE);
    let body = b.block();
    let (entry, exit) = (b.entry(), b.exit());

    let create = world.new_scope(&mut b, 0, 3);
    b.push(entry, create);
    let value = world.read(&mut b, 0);
    let argument = b.argument(0, RefKind::None, Some(world.scope), value);
    let check = b.invoke(world.check, None, vec![argument], Some(world.boolean));
    b.branch(entry, check, body, exit);
    let complete = world.complete(&mut b, 0);
    b.push(body, complete);
    b.goto(body, exit);
    let procedure = b.build().unwrap();

    let report = world.session(&registry).analyze(&procedure).unwrap();

    let stats = report.stats.unwrap();
    assert!(stats.iterations >= 2);
    assert_eq!(stats.interprocedural_calls, 1);
    assert_eq!(stats.degraded_calls, 0);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].severity, FindingSeverity::Maybe);
}

#[test]
fn test_ref_argument_to_analyzed_callee_keeps_state() {
    // var scope = new TS(); Touch(ref scope);  // Touch ignores its argument
    let world = World::new();
    let mut registry = ProcedureRegistry::new();
    registry.register(world.empty_body(ProcedureId(2), "Program.Touch", world.touch, RefKind::Ref));
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| {
        let create = world.new_scope(b, 0, 10);
        let value = world.read(b, 0);
        let argument = b.argument(0, RefKind::Ref, Some(world.scope), value);
        vec![create, b.invoke(world.touch, None, vec![argument], None)]
    });

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.stats.as_ref().unwrap().interprocedural_calls, 1);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, CompletionValueKind::NotCompleted);

    // without the body the argument escapes into unknown code
    let unknown = world.session(&ProcedureRegistry::new()).analyze(&procedure).unwrap();
    assert!(unknown.findings.is_empty());
}

#[test]
fn test_recursive_callee_terminates() {
    // static void Finish(TS scope) { Finish(scope); }
    let world = World::new();
    let mut registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(2), "Program.Finish")
        .in_file(FILE)
        .for_method(world.finish);
    b.parameter("scope", world.scope, RefKind::None);
    let body = b.block();
    let value = b.parameter_ref(0, Some(world.scope));
    let argument = b.argument(0, RefKind::None, Some(world.scope), value);
    let call = b.invoke(world.finish, None, vec![argument], None);
    b.push(body, call);
    let (entry, exit) = (b.entry(), b.exit());
    b.goto(entry, body);
    b.goto(body, exit);
    registry.register(b.build().unwrap());
    let procedure = run_and_finish(&world);

    let report = world.session(&registry).analyze(&procedure).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.stats.unwrap().interprocedural_calls, 1);
}

// ============================================================================
// Instance fields
// ============================================================================

#[test]
fn test_instance_field_default_is_tracked() {
    // this.scope.Complete();
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let field = FieldId(1);
    let procedure = straight_line(ProcedureId(1), "Program.CompleteField", |b| {
        let this = b.this(None);
        let read = b.field(field, Some(this), Some(world.scope));
        vec![b.invoke(world.complete, Some(read), vec![], None)]
    });
    let points_to = LocalPointsToAnalysis::analyze(&procedure);
    let config = CompletionConfig::from_preset(Preset::Thorough);
    let cancellation = CancellationToken::new();
    let target = ResolvedTarget {
        target_type: world.scope,
        completion_method: world.complete,
    };
    let context = CompletionAnalysisContext::new(
        &procedure,
        &points_to,
        &world.symbols,
        &registry,
        target,
        CompletionOptions::default(),
        &config,
        &cancellation,
    );

    let result = run_completion_analysis(&context).unwrap();

    let tracked = result.tracked_instance_fields.as_ref().unwrap();
    assert!(tracked.contains_key(&field));
    let location = AbstractLocation::field_default(field, Some(world.scope));
    assert_eq!(
        result.value_at_exit(&location).map(|v| v.kind()),
        Some(CompletionValueKind::Completed)
    );
}

#[test]
fn test_ref_parameter_is_released_at_exit() {
    // static void Open(ref TransactionScope scope) { scope = new TransactionScope(); }
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let mut b = ProcedureBuilder::new(ProcedureId(1), "Program.Open").in_file(FILE);
    b.parameter("scope", world.scope, RefKind::Ref);
    let body = b.block();
    let creation = b.new_object(
        world.scope_ctor,
        world.scope,
        vec![],
        SyntaxRef::at_line(3, "scope = new TransactionScope();"),
    );
    let target = b.parameter_ref(0, Some(world.scope));
    let store = b.assign(target, creation);
    b.push(body, store);
    let (entry, exit) = (b.entry(), b.exit());
    b.goto(entry, body);
    b.goto(body, exit);
    let procedure = b.build().unwrap();

    let points_to = LocalPointsToAnalysis::analyze(&procedure);
    let config = CompletionConfig::default();
    let cancellation = CancellationToken::new();
    let target = ResolvedTarget {
        target_type: world.scope,
        completion_method: world.complete,
    };
    let context = CompletionAnalysisContext::new(
        &procedure,
        &points_to,
        &world.symbols,
        &registry,
        target,
        CompletionOptions::default(),
        &config,
        &cancellation,
    );

    let result = run_completion_analysis(&context).unwrap();

    let parameter = AbstractLocation::parameter(procedure.id, 0, Some(world.scope));
    assert_eq!(
        result.value_at_exit(&parameter).map(|v| v.kind()),
        Some(CompletionValueKind::Unknown)
    );
    let allocation = AbstractLocation::allocation(
        OperationSite::new(procedure.id, creation),
        Some(world.scope),
    );
    assert_eq!(
        result.value_at_exit(&allocation).map(|v| v.kind()),
        Some(CompletionValueKind::Escaped)
    );
    assert!(world.session(&registry).analyze(&procedure).unwrap().findings.is_empty());
}

// ============================================================================
// Session behavior
// ============================================================================

#[test]
fn test_same_location_reported_once() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let first = straight_line(ProcedureId(1), "Program.Run", |b| vec![world.new_scope(b, 0, 10)]);
    let second = straight_line(ProcedureId(2), "Program.Run$local", |b| {
        vec![world.new_scope(b, 0, 10)]
    });

    let report = world.session(&registry).analyze_all(&[first, second]).unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.procedures_analyzed, 2);
}

#[test]
fn test_analyze_all_orders_findings_by_location() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let late = straight_line(ProcedureId(1), "Program.Late", |b| vec![world.new_scope(b, 0, 40)]);
    let early = straight_line(ProcedureId(2), "Program.Early", |b| vec![world.new_scope(b, 0, 4)]);
    let clean = straight_line(ProcedureId(3), "Program.Clean", |_| vec![]);

    let report = world.session(&registry).analyze_all(&[late, early, clean]).unwrap();

    let lines: Vec<u32> = report
        .findings
        .iter()
        .map(|f| f.location.span.start_line)
        .collect();
    assert_eq!(lines, vec![4, 40]);
    assert_eq!(report.procedures_skipped, 1);
    assert_eq!(report.definite_count(), 2);
}

#[test]
fn test_unresolved_target_is_soft() {
    let world = World::new();
    let symbols = World::without_target();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| vec![world.new_scope(b, 0, 10)]);
    let session = CompletionSession::new(TransactionScopeRule::define(), &symbols, &registry);

    assert!(matches!(
        session.resolve_target(),
        Err(CompletionError::TargetNotResolved { .. })
    ));
    let report = session.analyze(&procedure).unwrap();
    assert!(!report.was_analyzed());
}

#[test]
fn test_cancelled_session_fails() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| vec![world.new_scope(b, 0, 10)]);
    let token = CancellationToken::new();
    let session = world.session(&registry).with_cancellation(token.child());
    token.cancel();

    assert!(matches!(
        session.analyze(&procedure),
        Err(CompletionError::Cancelled)
    ));
}

#[test]
fn test_findings_serialize_to_json() {
    let world = World::new();
    let registry = ProcedureRegistry::new();
    let procedure = straight_line(ProcedureId(1), "Program.Run", |b| vec![world.new_scope(b, 0, 10)]);

    let report = world.session(&registry).analyze(&procedure).unwrap();
    let json = findings_to_json(&report.findings).unwrap();

    assert!(json.contains("\"rule_id\": \"XA0001\""));
    assert!(json.contains("Program.cs"));
}
