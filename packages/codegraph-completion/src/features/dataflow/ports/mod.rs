/*
 * Dataflow Ports
 *
 * Strategy interface plugged into `DataflowEngine`: one lattice plus the
 * transfer over a block's operations and along each outgoing edge.
 */

use crate::errors::Result;
use crate::features::dataflow::domain::AbstractDomain;
use crate::features::flow_graph::{BasicBlock, Edge};

/// Lattice value of a transfer function's domain
pub type DomainValue<T> = <<T as TransferFunction>::Domain as AbstractDomain>::Value;

pub trait TransferFunction {
    type Domain: AbstractDomain;

    fn domain(&self) -> &Self::Domain;

    /// Data flowing into the entry block
    fn initial_data(&mut self) -> <Self::Domain as AbstractDomain>::Value;

    /// Transfer over the block's root operations
    fn visit_block(
        &mut self,
        block: &BasicBlock,
        input: <Self::Domain as AbstractDomain>::Value,
    ) -> Result<<Self::Domain as AbstractDomain>::Value>;

    /// Transfer along one outgoing edge (the branch value under the edge's condition)
    fn visit_edge(
        &mut self,
        block: &BasicBlock,
        edge: &Edge,
        output: <Self::Domain as AbstractDomain>::Value,
    ) -> Result<<Self::Domain as AbstractDomain>::Value>;
}
