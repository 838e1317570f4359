/*
 * Operation Tree
 *
 * Closed set of operation shapes the completion transfer function inspects.
 * Operations live in the owning `Procedure` arena and reference each other
 * by `OperationId`; anything the analysis does not interpret is `Other`.
 */

use crate::shared::models::{FieldId, LocalId, MethodId, ProcedureId, Span, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable operation id within one procedure (arena index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId(pub u32);

impl OperationId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Operation qualified by its procedure; unique across call chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationSite {
    pub procedure: ProcedureId,
    pub operation: OperationId,
}

impl OperationSite {
    pub fn new(procedure: ProcedureId, operation: OperationId) -> Self {
        Self {
            procedure,
            operation,
        }
    }
}

impl fmt::Display for OperationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.procedure, self.operation)
    }
}

/// Argument / parameter passing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefKind {
    None,
    Ref,
    Out,
}

impl Default for RefKind {
    fn default() -> Self {
        RefKind::None
    }
}

/// Binary operators relevant to null checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorKind {
    /// Reference equality (`==`)
    Equals,
    /// Reference inequality (`!=`)
    NotEquals,
    /// Value equality (`is`, `Equals` lowered by the host)
    ObjectValueEquals,
    ObjectValueNotEquals,
    Other,
}

impl BinaryOperatorKind {
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equals | Self::ObjectValueEquals)
    }

    pub fn is_inequality(self) -> bool {
        matches!(self, Self::NotEquals | Self::ObjectValueNotEquals)
    }
}

/// Source text attached to an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntaxRef {
    pub span: Span,
    pub text: String,
}

impl SyntaxRef {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    /// Single-line syntax starting at column 0
    pub fn at_line(line: u32, text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.lines().next().map_or(0, |l| l.len() as u32);
        Self::new(Span::on_line(line, 0, len), text)
    }

    /// First line of the text, without trailing carriage return
    pub fn first_line(&self) -> &str {
        self.text
            .split('\n')
            .next()
            .unwrap_or("")
            .trim_end_matches('\r')
    }
}

/// Operation shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// `new T(args)`; arguments are `Argument` operations
    ObjectCreation {
        constructor: MethodId,
        arguments: Vec<OperationId>,
    },

    /// `instance.M(args)` or `M(args)` for static methods
    Invocation {
        method: MethodId,
        instance: Option<OperationId>,
        arguments: Vec<OperationId>,
    },

    /// Argument bound to parameter `index`; the operation type is the parameter type
    Argument {
        index: u32,
        ref_kind: RefKind,
        value: OperationId,
    },

    LocalReference {
        local: LocalId,
    },

    ParameterReference {
        index: u32,
    },

    /// `instance.field`; `None` instance for static fields
    FieldReference {
        field: FieldId,
        instance: Option<OperationId>,
    },

    /// `this`
    InstanceReference,

    Literal,

    NullLiteral,

    Conversion {
        operand: OperationId,
    },

    /// `target = value`
    Assignment {
        target: OperationId,
        value: OperationId,
    },

    BinaryOperator {
        operator: BinaryOperatorKind,
        left: OperationId,
        right: OperationId,
    },

    /// `x is null` / `x == null` lowered by the host into a unary test
    IsNull {
        operand: OperationId,
    },

    Return {
        value: Option<OperationId>,
    },

    Throw {
        value: Option<OperationId>,
    },

    /// Lambda or local function; `captures` are the locals it closes over
    DelegateCreation {
        body: Option<ProcedureId>,
        captures: Vec<LocalId>,
    },

    /// Anything else, visited for its children only
    Other {
        children: Vec<OperationId>,
    },
}

/// One node of the operation arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub kind: OperationKind,

    /// Static result type (parameter type for arguments)
    pub ty: Option<TypeId>,

    pub syntax: Option<SyntaxRef>,
    pub parent: Option<OperationId>,
}

impl Operation {
    pub fn new(id: OperationId, kind: OperationKind) -> Self {
        Self {
            id,
            kind,
            ty: None,
            syntax: None,
            parent: None,
        }
    }

    /// Children in evaluation order
    pub fn children(&self) -> Vec<OperationId> {
        match &self.kind {
            OperationKind::ObjectCreation { arguments, .. } => arguments.clone(),
            OperationKind::Invocation {
                instance,
                arguments,
                ..
            } => instance.iter().chain(arguments.iter()).copied().collect(),
            OperationKind::Argument { value, .. } => vec![*value],
            OperationKind::FieldReference { instance, .. } => instance.iter().copied().collect(),
            OperationKind::Conversion { operand } | OperationKind::IsNull { operand } => {
                vec![*operand]
            }
            OperationKind::Assignment { target, value } => vec![*target, *value],
            OperationKind::BinaryOperator { left, right, .. } => vec![*left, *right],
            OperationKind::Return { value } | OperationKind::Throw { value } => {
                value.iter().copied().collect()
            }
            OperationKind::Other { children } => children.clone(),
            OperationKind::LocalReference { .. }
            | OperationKind::ParameterReference { .. }
            | OperationKind::InstanceReference
            | OperationKind::Literal
            | OperationKind::NullLiteral
            | OperationKind::DelegateCreation { .. } => Vec::new(),
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self.kind, OperationKind::NullLiteral)
    }
}
