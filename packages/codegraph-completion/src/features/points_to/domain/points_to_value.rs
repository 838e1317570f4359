//! Points-to value: a set of abstract locations plus null classification

use super::abstract_location::AbstractLocation;
use super::null_value::NullAbstractValue;
use serde::{Deserialize, Serialize};

/// Persistent location set (cheap to clone out of the oracle)
pub type LocationSet = im::OrdSet<AbstractLocation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointsToKind {
    /// Not computed (e.g. void results)
    Undefined,
    /// `locations` is the complete set
    Known,
    /// Could point anywhere
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsToValue {
    pub kind: PointsToKind,
    pub locations: LocationSet,
    pub null_state: NullAbstractValue,
}

impl PointsToValue {
    pub fn undefined() -> Self {
        Self {
            kind: PointsToKind::Undefined,
            locations: LocationSet::new(),
            null_state: NullAbstractValue::Undefined,
        }
    }

    pub fn unknown() -> Self {
        Self {
            kind: PointsToKind::Unknown,
            locations: LocationSet::new(),
            null_state: NullAbstractValue::MaybeNull,
        }
    }

    pub fn known(locations: LocationSet, null_state: NullAbstractValue) -> Self {
        Self {
            kind: PointsToKind::Known,
            locations,
            null_state,
        }
    }

    pub fn single(location: AbstractLocation, null_state: NullAbstractValue) -> Self {
        Self::known(LocationSet::unit(location), null_state)
    }

    pub fn null() -> Self {
        Self::known(LocationSet::new(), NullAbstractValue::Null)
    }

    /// The only location, if the value is known and has exactly one
    pub fn single_location(&self) -> Option<&AbstractLocation> {
        if self.kind == PointsToKind::Known && self.locations.len() == 1 {
            self.locations.iter().next()
        } else {
            None
        }
    }

    /// Least upper bound
    pub fn union(&self, other: &Self) -> Self {
        let kind = match (self.kind, other.kind) {
            (PointsToKind::Unknown, _) | (_, PointsToKind::Unknown) => PointsToKind::Unknown,
            (PointsToKind::Undefined, k) | (k, PointsToKind::Undefined) => k,
            _ => PointsToKind::Known,
        };
        Self {
            kind,
            locations: self.locations.clone().union(other.locations.clone()),
            null_state: self.null_state.merge(other.null_state),
        }
    }
}

impl Default for PointsToValue {
    fn default() -> Self {
        Self::undefined()
    }
}
