/*
 * Completion Ports
 *
 * Host-side services the completion analysis consumes:
 * - SymbolResolver: types, methods and subtyping of one compilation
 * - ProcedureProvider: callee bodies for interprocedural analysis
 *
 * Both are shared across worker threads.
 */

use crate::features::flow_graph::Procedure;
use crate::features::points_to::PointsToOracle;
use crate::shared::models::{CompilationId, MethodId, TypeId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Coarse type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// `System.Object`
    Object,
    Delegate,
    Boolean,
    /// Struct / enum / primitive other than bool
    ValueType,
    /// Ref-like struct (tracked like a reference type)
    RefLikeValueType,
    Class,
    Interface,
}

impl TypeKind {
    /// Values of this kind live in an abstract heap location
    pub fn is_reference_like(self) -> bool {
        !matches!(self, Self::ValueType | Self::Boolean)
    }
}

/// Method signature as seen by the analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub containing_type: TypeId,
    pub is_static: bool,
    pub is_constructor: bool,
    pub return_type: Option<TypeId>,
    pub parameter_types: Vec<TypeId>,
}

pub trait SymbolResolver: Send + Sync {
    /// Identity of the compilation the symbols belong to
    fn compilation_id(&self) -> CompilationId;

    /// Type by fully qualified metadata name
    fn resolve_type(&self, full_name: &str) -> Option<TypeId>;

    /// First non-static method of `ty` named `name`
    fn find_instance_method(&self, ty: TypeId, name: &str) -> Option<MethodId>;

    /// `ty` equals, derives from, or implements `target`
    fn is_target(&self, ty: TypeId, target: TypeId) -> bool;

    fn type_kind(&self, ty: TypeId) -> Option<TypeKind>;

    fn method(&self, method: MethodId) -> Option<MethodSignature>;
}

/// Callee body plus the alias information computed for it
#[derive(Clone)]
pub struct CalleeBody {
    pub procedure: Arc<Procedure>,
    pub points_to: Arc<dyn PointsToOracle>,
}

impl std::fmt::Debug for CalleeBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalleeBody")
            .field("procedure", &self.procedure.name)
            .finish_non_exhaustive()
    }
}

pub trait ProcedureProvider: Send + Sync {
    /// Body of `method`, if available in source
    fn callee_body(&self, method: MethodId) -> Option<CalleeBody>;
}
