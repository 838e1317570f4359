/*
 * In-memory Symbol Table
 *
 * Reference `SymbolResolver` for hosts that lower their own type system and
 * for tests. Types form a single-inheritance class hierarchy plus interface
 * lists; ids are dense indices.
 */

use crate::features::completion::ports::{MethodSignature, SymbolResolver, TypeKind};
use crate::shared::models::{CompilationId, MethodId, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone)]
struct TypeEntry {
    full_name: String,
    kind: TypeKind,
    base: Option<TypeId>,
    interfaces: Vec<TypeId>,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    compilation: CompilationId,
    types: Vec<TypeEntry>,
    by_name: FxHashMap<String, TypeId>,
    methods: Vec<MethodSignature>,
}

impl SymbolTable {
    pub fn new(compilation: CompilationId) -> Self {
        Self {
            compilation,
            types: Vec::new(),
            by_name: FxHashMap::default(),
            methods: Vec::new(),
        }
    }

    /// Register a type; re-registering a name returns the existing id
    pub fn add_type(&mut self, full_name: impl Into<String>, kind: TypeKind) -> TypeId {
        let full_name = full_name.into();
        if let Some(&id) = self.by_name.get(&full_name) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.by_name.insert(full_name.clone(), id);
        self.types.push(TypeEntry {
            full_name,
            kind,
            base: None,
            interfaces: Vec::new(),
        });
        id
    }

    /// Register a class deriving from `base` and implementing `interfaces`
    pub fn add_class(
        &mut self,
        full_name: impl Into<String>,
        base: Option<TypeId>,
        interfaces: &[TypeId],
    ) -> TypeId {
        let id = self.add_type(full_name, TypeKind::Class);
        let entry = &mut self.types[id.0 as usize];
        entry.base = base;
        entry.interfaces = interfaces.to_vec();
        id
    }

    pub fn add_method(&mut self, signature: MethodSignature) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(signature);
        id
    }

    pub fn add_instance_method(
        &mut self,
        containing_type: TypeId,
        name: impl Into<String>,
        parameter_types: Vec<TypeId>,
        return_type: Option<TypeId>,
    ) -> MethodId {
        self.add_method(MethodSignature {
            name: name.into(),
            containing_type,
            is_static: false,
            is_constructor: false,
            return_type,
            parameter_types,
        })
    }

    pub fn add_static_method(
        &mut self,
        containing_type: TypeId,
        name: impl Into<String>,
        parameter_types: Vec<TypeId>,
        return_type: Option<TypeId>,
    ) -> MethodId {
        self.add_method(MethodSignature {
            name: name.into(),
            containing_type,
            is_static: true,
            is_constructor: false,
            return_type,
            parameter_types,
        })
    }

    pub fn add_constructor(&mut self, containing_type: TypeId, parameter_types: Vec<TypeId>) -> MethodId {
        self.add_method(MethodSignature {
            name: ".ctor".to_string(),
            containing_type,
            is_static: false,
            is_constructor: true,
            return_type: None,
            parameter_types,
        })
    }

    pub fn type_name(&self, ty: TypeId) -> Option<&str> {
        self.entry(ty).map(|e| e.full_name.as_str())
    }

    fn entry(&self, ty: TypeId) -> Option<&TypeEntry> {
        self.types.get(ty.0 as usize)
    }
}

impl SymbolResolver for SymbolTable {
    fn compilation_id(&self) -> CompilationId {
        self.compilation
    }

    fn resolve_type(&self, full_name: &str) -> Option<TypeId> {
        self.by_name.get(full_name).copied()
    }

    fn find_instance_method(&self, ty: TypeId, name: &str) -> Option<MethodId> {
        self.methods
            .iter()
            .position(|m| m.containing_type == ty && !m.is_static && !m.is_constructor && m.name == name)
            .map(|index| MethodId(index as u32))
    }

    fn is_target(&self, ty: TypeId, target: TypeId) -> bool {
        let mut pending = vec![ty];
        let mut seen = FxHashSet::default();
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(entry) = self.entry(current) {
                pending.extend(entry.base);
                pending.extend(entry.interfaces.iter().copied());
            }
        }
        false
    }

    fn type_kind(&self, ty: TypeId) -> Option<TypeKind> {
        self.entry(ty).map(|e| e.kind)
    }

    fn method(&self, method: MethodId) -> Option<MethodSignature> {
        self.methods.get(method.0 as usize).cloned()
    }
}
