//! Points-to domain models

pub mod abstract_location;
pub mod null_value;
pub mod points_to_value;

pub use abstract_location::{AbstractLocation, CreationSite, LocationKind};
pub use null_value::NullAbstractValue;
pub use points_to_value::{LocationSet, PointsToKind, PointsToValue};
