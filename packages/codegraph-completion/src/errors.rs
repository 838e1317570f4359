//! Error types for codegraph-completion
//!
//! Provides unified error handling across the crate.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for completion analysis
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Cooperative cancellation was requested
    #[error("Analysis cancelled")]
    Cancelled,

    /// Target type or completion method could not be resolved in the compilation
    #[error("Target not resolved: {target_type}.{method}")]
    TargetNotResolved { target_type: String, method: String },

    /// Procedure has no body / CFG
    #[error("CFG unavailable for procedure '{0}'")]
    CfgUnavailable(String),

    /// Fixpoint iteration limit reached
    #[error("Fixpoint did not converge for '{procedure}' after {iterations} iterations")]
    FixpointNotConverged { procedure: String, iterations: usize },

    /// Malformed control-flow graph
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CompletionError {
    /// Create an invalid graph error
    pub fn invalid_graph(msg: impl Into<String>) -> Self {
        CompletionError::InvalidGraph(msg.into())
    }

    /// Soft failures produce no findings instead of aborting a session
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            CompletionError::TargetNotResolved { .. }
                | CompletionError::CfgUnavailable(_)
                | CompletionError::FixpointNotConverged { .. }
        )
    }
}

/// Result type alias for completion analysis operations
pub type Result<T> = std::result::Result<T, CompletionError>;
