/*
 * Points-to Ports
 *
 * Interface the completion engine consumes. Implementations must be
 * deterministic for a given procedure.
 */

use crate::features::flow_graph::OperationId;
use crate::features::points_to::domain::{LocationSet, NullAbstractValue, PointsToValue};

pub trait PointsToOracle: Send + Sync {
    /// Locations `operation` may evaluate to
    fn points_to(&self, operation: OperationId) -> PointsToValue;

    /// Locations that become reachable from outside the procedure at `operation`
    fn escaped_locations(&self, operation: OperationId) -> LocationSet;

    /// Value of parameter `index` on entry
    fn parameter_points_to(&self, index: u32) -> PointsToValue;

    fn null_value(&self, operation: OperationId) -> NullAbstractValue {
        self.points_to(operation).null_state
    }
}
