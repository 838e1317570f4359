/*
 * Dataflow Framework
 *
 * Generic forward dataflow over a `ControlFlowGraph`:
 * - Domain: `AbstractDomain` lattice trait, persistent `MapDomain`, cancellation
 * - Ports: `TransferFunction` strategy (lattice + per-block/per-edge transfer)
 * - Application: `DataflowEngine` (reverse-postorder fixpoint)
 *
 * References:
 * - Kildall (1973) "A Unified Approach to Global Program Optimization"
 */

pub mod application;
pub mod domain;
pub mod ports;

pub use application::{merge_back_edge, BlockState, DataflowEngine, FixpointOutput};
pub use domain::{AbstractDomain, CancellationToken, MapData, MapDomain};
pub use ports::{DomainValue, TransferFunction};
