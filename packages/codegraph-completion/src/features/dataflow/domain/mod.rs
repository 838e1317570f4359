//! Dataflow domain

pub mod cancellation;
pub mod lattice;
pub mod map_domain;

pub use cancellation::CancellationToken;
pub use lattice::AbstractDomain;
pub use map_domain::{MapData, MapDomain};
