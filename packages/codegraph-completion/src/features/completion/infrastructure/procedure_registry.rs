//! Procedure registry
//!
//! Reference `ProcedureProvider`: callee bodies by method symbol, each with
//! its local points-to result computed once at registration.

use crate::features::completion::ports::{CalleeBody, ProcedureProvider};
use crate::features::flow_graph::Procedure;
use crate::features::points_to::{LocalPointsToAnalysis, PointsToOracle};
use crate::shared::models::MethodId;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ProcedureRegistry {
    bodies: FxHashMap<MethodId, CalleeBody>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `procedure` under its method symbol
    ///
    /// Procedures without a method symbol (lambdas) cannot be called by
    /// symbol and are returned without being registered.
    pub fn register(&mut self, procedure: Procedure) -> Arc<Procedure> {
        let points_to = Arc::new(LocalPointsToAnalysis::analyze(&procedure));
        self.register_with_oracle(procedure, points_to)
    }

    /// Register with host-provided alias information
    pub fn register_with_oracle(
        &mut self,
        procedure: Procedure,
        points_to: Arc<dyn PointsToOracle>,
    ) -> Arc<Procedure> {
        let procedure = Arc::new(procedure);
        match procedure.method {
            Some(method) => {
                self.bodies.insert(
                    method,
                    CalleeBody {
                        procedure: Arc::clone(&procedure),
                        points_to,
                    },
                );
            }
            None => {
                tracing::debug!(procedure = %procedure.name, "Skipping registration without method symbol");
            }
        }
        procedure
    }

    pub fn body(&self, method: MethodId) -> Option<&CalleeBody> {
        self.bodies.get(&method)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl ProcedureProvider for ProcedureRegistry {
    fn callee_body(&self, method: MethodId) -> Option<CalleeBody> {
        self.bodies.get(&method).cloned()
    }
}
