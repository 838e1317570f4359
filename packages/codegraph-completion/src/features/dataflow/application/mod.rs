//! Dataflow application layer

pub mod engine;

pub use engine::{merge_back_edge, BlockState, DataflowEngine, FixpointOutput};
