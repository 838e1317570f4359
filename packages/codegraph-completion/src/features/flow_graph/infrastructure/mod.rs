//! Flow graph infrastructure

pub mod builder;
pub mod ordering;

pub use builder::ProcedureBuilder;
pub use ordering::{back_edges, reverse_postorder};
