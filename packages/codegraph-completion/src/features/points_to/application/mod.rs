//! Points-to application layer

pub mod local_analysis;

pub use local_analysis::LocalPointsToAnalysis;
