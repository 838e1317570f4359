/*
 * Dataflow Engine
 *
 * Forward fixpoint over a CFG in reverse postorder.
 *
 * # Algorithm
 * - Block input = join of the states on its incoming edges; a block none of
 *   whose predecessors has produced a state yet is unreachable and skipped
 * - Back edges join through `merge_back_edge`
 * - Per block: `visit_block` → output; per successor edge: `visit_edge`
 * - Passes repeat until no edge state changes
 *
 * # Time Complexity
 * O(passes × (blocks + edges) × transfer cost); passes are bounded by the
 * lattice height and by `max_iterations`.
 */

use crate::errors::{CompletionError, Result};
use crate::features::dataflow::domain::{AbstractDomain, CancellationToken};
use crate::features::dataflow::ports::{DomainValue, TransferFunction};
use crate::features::flow_graph::{back_edges, reverse_postorder, BlockId, ControlFlowGraph};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Input/output snapshot of one block (`None` = never reached)
#[derive(Debug, Clone, PartialEq)]
pub struct BlockState<V> {
    pub input: Option<V>,
    pub output: Option<V>,
}

impl<V> Default for BlockState<V> {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
        }
    }
}

/// Fixpoint result
#[derive(Debug, Clone)]
pub struct FixpointOutput<V> {
    /// Indexed by `BlockId`
    pub blocks: Vec<BlockState<V>>,
    pub exit: BlockId,
    pub iterations: usize,
    pub non_monotonic_updates: usize,
}

impl<V> FixpointOutput<V> {
    pub fn block(&self, id: BlockId) -> Option<&BlockState<V>> {
        self.blocks.get(id.index())
    }

    /// State at the end of the exit block (`None` if the exit is unreachable)
    pub fn exit_output(&self) -> Option<&V> {
        self.block(self.exit).and_then(|b| b.output.as_ref())
    }
}

/// Join a forward state with a back-edge state
///
/// An unreachable side adopts the other side's data; two reachable sides
/// take the lattice merge.
pub fn merge_back_edge<D: AbstractDomain>(
    domain: &D,
    forward: Option<D::Value>,
    back: Option<D::Value>,
) -> Option<D::Value> {
    match (forward, back) {
        (Some(f), Some(b)) => Some(domain.merge(&f, &b)),
        (Some(f), None) => Some(f),
        (None, Some(b)) => {
            tracing::trace!("Block reachable only through a back edge");
            Some(b)
        }
        (None, None) => None,
    }
}

fn join_forward<D: AbstractDomain>(
    domain: &D,
    current: Option<D::Value>,
    incoming: &D::Value,
) -> Option<D::Value> {
    Some(match current {
        Some(c) => domain.merge(&c, incoming),
        None => incoming.clone(),
    })
}

#[derive(Debug, Clone)]
pub struct DataflowEngine {
    max_iterations: usize,
}

impl Default for DataflowEngine {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
        }
    }
}

impl DataflowEngine {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Run `transfer` over `cfg` to a fixpoint
    pub fn run<T: TransferFunction>(
        &self,
        name: &str,
        cfg: &ControlFlowGraph,
        transfer: &mut T,
        cancellation: &CancellationToken,
    ) -> Result<FixpointOutput<DomainValue<T>>> {
        cfg.validate().map_err(CompletionError::InvalidGraph)?;

        let order = reverse_postorder(cfg);
        let back = back_edges(cfg, &order);

        // destination → [(source, successor index)]
        let mut incoming: FxHashMap<BlockId, Vec<(BlockId, usize)>> = FxHashMap::default();
        for block in &cfg.blocks {
            for (index, edge) in block.successors.iter().enumerate() {
                incoming
                    .entry(edge.destination)
                    .or_default()
                    .push((block.id, index));
            }
        }

        let initial = transfer.initial_data();
        let mut edge_states: FxHashMap<(BlockId, usize), DomainValue<T>> = FxHashMap::default();
        let mut blocks: Vec<BlockState<DomainValue<T>>> =
            (0..cfg.blocks.len()).map(|_| BlockState::default()).collect();
        let mut iterations = 0usize;
        let mut non_monotonic_updates = 0usize;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                tracing::warn!(procedure = name, iterations, "Fixpoint iteration limit reached");
                return Err(CompletionError::FixpointNotConverged {
                    procedure: name.to_string(),
                    iterations: self.max_iterations,
                });
            }

            let mut changed = false;
            for &block_id in &order {
                cancellation.check()?;
                let Some(block) = cfg.block(block_id) else {
                    continue;
                };

                let mut forward = (block_id == cfg.entry).then(|| initial.clone());
                let mut back_state = None;
                for (source, index) in incoming.get(&block_id).into_iter().flatten() {
                    let Some(state) = edge_states.get(&(*source, *index)) else {
                        continue;
                    };
                    if back.contains(&(*source, block_id)) {
                        back_state = join_forward(transfer.domain(), back_state, state);
                    } else {
                        forward = join_forward(transfer.domain(), forward, state);
                    }
                }
                let Some(input) = merge_back_edge(transfer.domain(), forward, back_state) else {
                    continue;
                };

                let output = transfer.visit_block(block, input.clone())?;
                for (index, edge) in block.successors.iter().enumerate() {
                    let state = transfer.visit_edge(block, edge, output.clone())?;
                    match edge_states.get(&(block_id, index)) {
                        Some(old) if *old == state => {}
                        Some(old) => {
                            if transfer.domain().compare(old, &state, true) == Ordering::Greater {
                                non_monotonic_updates += 1;
                            }
                            edge_states.insert((block_id, index), state);
                            changed = true;
                        }
                        None => {
                            edge_states.insert((block_id, index), state);
                            changed = true;
                        }
                    }
                }

                let snapshot = &mut blocks[block_id.index()];
                snapshot.input = Some(input);
                snapshot.output = Some(output);
            }

            if !changed {
                break;
            }
        }

        tracing::debug!(
            procedure = name,
            iterations,
            blocks = order.len(),
            non_monotonic_updates,
            "Fixpoint reached"
        );

        Ok(FixpointOutput {
            blocks,
            exit: cfg.exit,
            iterations,
            non_monotonic_updates,
        })
    }
}
