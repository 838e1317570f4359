//! Common test utilities for codegraph-completion
//!
//! A small `TransactionScope` world (types + methods) and helpers that
//! lower the usual C# shapes into operations.

#![allow(dead_code)]

use codegraph_completion::config::{CompletionConfig, CompletionOptions, Preset};
use codegraph_completion::features::completion::{
    CompletionSession, ProcedureRegistry, SymbolTable, TransactionScopeRule, TypeKind,
};
use codegraph_completion::features::flow_graph::{
    OperationId, ProcedureBuilder, RefKind, SyntaxRef,
};
use codegraph_completion::shared::models::{CompilationId, LocalId, MethodId, ProcedureId, TypeId};

pub const FILE: &str = "Program.cs";

pub struct World {
    pub symbols: SymbolTable,
    pub object: TypeId,
    pub boolean: TypeId,
    pub scope: TypeId,
    pub scope_ctor: MethodId,
    pub complete: MethodId,

    /// `static void Consume(TransactionScope scope)`, no body
    pub consume: MethodId,

    /// `static TransactionScope Create()`, no body
    pub create: MethodId,

    /// `static bool TryGet(out TransactionScope scope)`, no body
    pub try_get: MethodId,

    /// `static bool TryGetScope(ref TransactionScope scope)`, no body
    pub try_get_ref: MethodId,

    /// `static bool Refresh(ref TransactionScope scope)`, no body
    pub refresh: MethodId,

    /// `static void Finish(TransactionScope scope)`
    pub finish: MethodId,

    /// `static bool Check(TransactionScope scope)`
    pub check: MethodId,

    /// `static void Touch(ref TransactionScope scope)`
    pub touch: MethodId,

    /// `class Wrapper { Wrapper(TransactionScope scope) }`
    pub wrapper: TypeId,
    pub wrapper_ctor: MethodId,
}

impl World {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new(CompilationId(1));
        let object = symbols.add_type("System.Object", TypeKind::Object);
        let boolean = symbols.add_type("System.Boolean", TypeKind::Boolean);
        let scope = symbols.add_class(TransactionScopeRule::TARGET_TYPE, None, &[]);
        let scope_ctor = symbols.add_constructor(scope, vec![]);
        let complete = symbols.add_instance_method(scope, TransactionScopeRule::COMPLETION_METHOD, vec![], None);

        let program = symbols.add_class("App.Program", None, &[]);
        let consume = symbols.add_static_method(program, "Consume", vec![scope], None);
        let create = symbols.add_static_method(scope, "Create", vec![], Some(scope));
        let try_get = symbols.add_static_method(program, "TryGet", vec![scope], Some(boolean));
        let try_get_ref = symbols.add_static_method(program, "TryGetScope", vec![scope], Some(boolean));
        let refresh = symbols.add_static_method(program, "Refresh", vec![scope], Some(boolean));
        let finish = symbols.add_static_method(program, "Finish", vec![scope], None);
        let check = symbols.add_static_method(program, "Check", vec![scope], Some(boolean));
        let touch = symbols.add_static_method(program, "Touch", vec![scope], None);

        let wrapper = symbols.add_class("App.Wrapper", None, &[]);
        let wrapper_ctor = symbols.add_constructor(wrapper, vec![scope]);

        Self {
            symbols,
            object,
            boolean,
            scope,
            scope_ctor,
            complete,
            consume,
            create,
            try_get,
            try_get_ref,
            refresh,
            finish,
            check,
            touch,
            wrapper,
            wrapper_ctor,
        }
    }

    /// Symbols without the target type (rule cannot resolve)
    pub fn without_target() -> SymbolTable {
        let mut symbols = SymbolTable::new(CompilationId(2));
        symbols.add_type("System.Object", TypeKind::Object);
        symbols
    }

    pub fn session<'a>(&'a self, registry: &'a ProcedureRegistry) -> CompletionSession<'a> {
        CompletionSession::new(TransactionScopeRule::define(), &self.symbols, registry)
    }

    pub fn fast_session<'a>(&'a self, registry: &'a ProcedureRegistry) -> CompletionSession<'a> {
        self.session(registry)
            .with_config(CompletionConfig::from_preset(Preset::Fast))
    }

    pub fn session_with<'a>(
        &'a self,
        registry: &'a ProcedureRegistry,
        options: CompletionOptions,
    ) -> CompletionSession<'a> {
        self.session(registry).with_completion_options(options)
    }

    /// `var scope = new TransactionScope();` on `line`, stored into `local`
    pub fn new_scope(&self, b: &mut ProcedureBuilder, local: u32, line: u32) -> OperationId {
        let creation = b.new_object(
            self.scope_ctor,
            self.scope,
            vec![],
            SyntaxRef::at_line(line, "var scope = new TransactionScope();"),
        );
        let target = b.local(LocalId(local), Some(self.scope));
        b.assign(target, creation)
    }

    pub fn read(&self, b: &mut ProcedureBuilder, local: u32) -> OperationId {
        b.local(LocalId(local), Some(self.scope))
    }

    /// `scope.Complete();`
    pub fn complete(&self, b: &mut ProcedureBuilder, local: u32) -> OperationId {
        let instance = self.read(b, local);
        b.invoke(self.complete, Some(instance), vec![], None)
    }

    /// `method(scope);` for a static method taking one scope
    pub fn pass(&self, b: &mut ProcedureBuilder, method: MethodId, local: u32) -> OperationId {
        let value = self.read(b, local);
        let argument = b.argument(0, RefKind::None, Some(self.scope), value);
        b.invoke(method, None, vec![argument], None)
    }

    /// `TryGet(out var scope)` on `line`
    pub fn try_get(&self, b: &mut ProcedureBuilder, local: u32, line: u32) -> OperationId {
        let target = self.read(b, local);
        let argument = b.argument(0, RefKind::Out, Some(self.scope), target);
        b.with_syntax(argument, SyntaxRef::at_line(line, "TryGet(out var scope)"));
        b.invoke(self.try_get, None, vec![argument], Some(self.boolean))
    }

    /// `method(ref scope)` for a bool method taking one scope by ref
    pub fn pass_by_ref(&self, b: &mut ProcedureBuilder, method: MethodId, local: u32) -> OperationId {
        let value = self.read(b, local);
        let argument = b.argument(0, RefKind::Ref, Some(self.scope), value);
        b.invoke(method, None, vec![argument], Some(self.boolean))
    }

    /// Body of a static method taking one scope that does nothing with it
    pub fn empty_body(
        &self,
        id: ProcedureId,
        name: &str,
        method: MethodId,
        ref_kind: RefKind,
    ) -> codegraph_completion::Procedure {
        let mut b = ProcedureBuilder::new(id, name).in_file(FILE).for_method(method);
        b.parameter("scope", self.scope, ref_kind);
        let body = b.block();
        let (entry, exit) = (b.entry(), b.exit());
        b.goto(entry, body);
        b.goto(body, exit);
        b.build().unwrap()
    }

    /// Body of `static void Finish(TransactionScope scope) { scope.Complete(); }`
    pub fn finish_body(&self, id: ProcedureId) -> codegraph_completion::Procedure {
        let mut b = ProcedureBuilder::new(id, "Program.Finish")
            .in_file(FILE)
            .for_method(self.finish);
        b.parameter("scope", self.scope, RefKind::None);
        let body = b.block();
        let instance = b.parameter_ref(0, Some(self.scope));
        let complete = b.invoke(self.complete, Some(instance), vec![], None);
        b.push(body, complete);
        let (entry, exit) = (b.entry(), b.exit());
        b.goto(entry, body);
        b.goto(body, exit);
        b.build().unwrap()
    }
}

/// Procedure with one body block holding `ops`
pub fn straight_line(
    id: ProcedureId,
    name: &str,
    build: impl FnOnce(&mut ProcedureBuilder) -> Vec<OperationId>,
) -> codegraph_completion::Procedure {
    let mut b = ProcedureBuilder::new(id, name).in_file(FILE);
    let body = b.block();
    for op in build(&mut b) {
        b.push(body, op);
    }
    let (entry, exit) = (b.entry(), b.exit());
    b.goto(entry, body);
    b.goto(body, exit);
    b.build().unwrap()
}
