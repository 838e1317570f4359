//! Target resolution cache
//!
//! Memoizes target type + completion method resolution per
//! (compilation, target type name, method name). A key is resolved at most
//! once; unresolvable keys are cached as `None` too.

use crate::features::completion::domain::CompletionRule;
use crate::features::completion::ports::SymbolResolver;
use crate::shared::models::{CompilationId, MethodId, TypeId};
use dashmap::DashMap;

/// Resolved target of one rule in one compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedTarget {
    pub target_type: TypeId,
    pub completion_method: MethodId,
}

type ResolutionKey = (CompilationId, String, String);

#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<ResolutionKey, Option<ResolvedTarget>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `rule` against `resolver`, computing at most once per key
    pub fn get_or_resolve(
        &self,
        resolver: &dyn SymbolResolver,
        rule: &CompletionRule,
    ) -> Option<ResolvedTarget> {
        let key = (
            resolver.compilation_id(),
            rule.target_type_full_name.clone(),
            rule.completion_method_name.clone(),
        );
        if let Some(hit) = self.entries.get(&key) {
            tracing::trace!(compilation = %key.0, target = %key.1, "Resolution cache hit");
            return *hit;
        }

        // entry() holds the shard lock while resolving (releases with *)
        *self
            .entries
            .entry(key)
            .or_insert_with(|| resolve(resolver, rule))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn resolve(resolver: &dyn SymbolResolver, rule: &CompletionRule) -> Option<ResolvedTarget> {
    let Some(target_type) = resolver.resolve_type(&rule.target_type_full_name) else {
        tracing::debug!(target = %rule.target_type_full_name, "Target type not found in compilation");
        return None;
    };
    let Some(completion_method) =
        resolver.find_instance_method(target_type, &rule.completion_method_name)
    else {
        tracing::debug!(
            target = %rule.target_type_full_name,
            method = %rule.completion_method_name,
            "Completion method not found on target type"
        );
        return None;
    };
    Some(ResolvedTarget {
        target_type,
        completion_method,
    })
}
