//! Completion analysis result

use crate::features::completion::domain::{CompletionAbstractValue, CompletionAnalysisData};
use crate::features::dataflow::BlockState;
use crate::features::flow_graph::BlockId;
use crate::features::points_to::{AbstractLocation, PointsToValue};
use crate::shared::models::{FieldId, ProcedureId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Analysis statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Number of fixpoint passes
    pub iterations: usize,

    /// Number of blocks in the CFG
    pub blocks: usize,

    /// Locations with a completion state at the exit
    pub tracked_locations: usize,

    /// Call sites whose callee body was analyzed (transitively)
    pub interprocedural_calls: usize,

    /// Call sites degraded to Unknown (no body, recursion, depth budget)
    pub degraded_calls: usize,

    /// Edge updates that moved down the lattice
    pub non_monotonic_updates: usize,

    /// Analysis time (milliseconds)
    pub analysis_time_ms: u64,
}

impl AnalysisStats {
    /// Fold callee counters into the caller's
    pub fn absorb_callee(&mut self, callee: &AnalysisStats) {
        self.interprocedural_calls += callee.interprocedural_calls;
        self.degraded_calls += callee.degraded_calls;
        self.non_monotonic_updates += callee.non_monotonic_updates;
    }
}

#[derive(Debug, Clone)]
pub struct CompletionAnalysisResult {
    pub procedure: ProcedureId,

    /// Indexed by `BlockId`
    pub blocks: Vec<BlockState<CompletionAnalysisData>>,

    pub exit: BlockId,

    /// `this.field` default instances tracked as creations (field-tracking mode)
    pub tracked_instance_fields: Option<FxHashMap<FieldId, PointsToValue>>,

    pub stats: AnalysisStats,
}

impl CompletionAnalysisResult {
    pub fn block(&self, id: BlockId) -> Option<&BlockState<CompletionAnalysisData>> {
        self.blocks.get(id.index())
    }

    /// Data at the end of the exit block (`None` if no normal path reaches it)
    pub fn exit_data(&self) -> Option<&CompletionAnalysisData> {
        self.block(self.exit).and_then(|b| b.output.as_ref())
    }

    pub fn value_at_exit(&self, location: &AbstractLocation) -> Option<&CompletionAbstractValue> {
        self.exit_data().and_then(|data| data.get(location))
    }
}
