//! Abstract Location
//!
//! Identity of one storage cell the completion state is attached to.
//! Each `new T()` (and each call result / out argument) is its own allocation
//! site; parameters and `this.field` default slots get one location each.
//! Equality is structural: two locations are the same cell iff kind and type match.

use crate::features::flow_graph::OperationSite;
use crate::shared::models::{FieldId, ProcedureId, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation that created an allocation, qualified by its procedure
pub type CreationSite = OperationSite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    /// The null reference; never tracked
    Null,

    /// Allocation site
    Allocation(CreationSite),

    /// Value of a parameter on entry
    Parameter { procedure: ProcedureId, index: u32 },

    /// Default content of `this.field`
    FieldDefault(FieldId),
}

/// Abstract heap location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbstractLocation {
    pub kind: LocationKind,

    /// Static type of the cell (if known)
    pub ty: Option<TypeId>,
}

impl AbstractLocation {
    #[inline]
    pub fn allocation(site: CreationSite, ty: Option<TypeId>) -> Self {
        Self {
            kind: LocationKind::Allocation(site),
            ty,
        }
    }

    #[inline]
    pub fn parameter(procedure: ProcedureId, index: u32, ty: Option<TypeId>) -> Self {
        Self {
            kind: LocationKind::Parameter { procedure, index },
            ty,
        }
    }

    #[inline]
    pub fn field_default(field: FieldId, ty: Option<TypeId>) -> Self {
        Self {
            kind: LocationKind::FieldDefault(field),
            ty,
        }
    }

    #[inline]
    pub fn null() -> Self {
        Self {
            kind: LocationKind::Null,
            ty: None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.kind, LocationKind::Null)
    }

    /// Creation site (allocations only)
    #[inline]
    pub fn creation(&self) -> Option<CreationSite> {
        match self.kind {
            LocationKind::Allocation(site) => Some(site),
            _ => None,
        }
    }

    #[inline]
    pub fn is_field_default(&self) -> bool {
        matches!(self.kind, LocationKind::FieldDefault(_))
    }
}

impl fmt::Display for AbstractLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocationKind::Null => write!(f, "null"),
            LocationKind::Allocation(site) => {
                write!(f, "alloc:{}:{}", site.procedure, site.operation)
            }
            LocationKind::Parameter { procedure, index } => {
                write!(f, "param:{}:{}", procedure, index)
            }
            LocationKind::FieldDefault(field) => write!(f, "default:{}", field),
        }?;
        if let Some(ty) = self.ty {
            write!(f, ":{}", ty)?;
        }
        Ok(())
    }
}
