//! # Points-to Oracle
//!
//! Alias information consumed by the completion engine:
//! - abstract locations (allocation sites, parameters, field default slots)
//! - per-operation points-to values with null classification
//! - per-operation escaped locations
//!
//! The engine depends only on the `PointsToOracle` port. `LocalPointsToAnalysis`
//! is a flow-insensitive, allocation-site based implementation over a
//! `Procedure` arena.

pub mod application;
pub mod domain;
pub mod ports;

pub use application::LocalPointsToAnalysis;
pub use domain::{
    AbstractLocation, CreationSite, LocationKind, LocationSet, NullAbstractValue, PointsToKind,
    PointsToValue,
};
pub use ports::PointsToOracle;
