//! Completion Analysis Configuration
//!
//! Two layers:
//! - Engine configuration (`CompletionConfig`): preset + YAML, validated
//! - Per-procedure analyzer options (`CompletionOptions`): read through an
//!   `OptionReader` with rule-scoped keys
//!
//! # Examples
//!
//! ```rust,ignore
//! use codegraph_completion::config::{CompletionConfig, Preset};
//!
//! let config = CompletionConfig::from_preset(Preset::Thorough);
//! let config = CompletionConfig::from_yaml_str("max_interprocedural_depth: 5")?;
//! ```

pub mod completion_config;
pub mod error;
pub mod options;
pub mod validation;

pub use completion_config::{CompletionConfig, Preset};
pub use error::{ConfigError, ConfigResult};
pub use options::{
    CompletionOptions, MapOptionReader, OptionReader, OPTION_ANALYSIS_KIND,
    OPTION_OWNERSHIP_TRANSFER_AT_CONSTRUCTOR, OPTION_OWNERSHIP_TRANSFER_AT_METHOD_CALL,
};
pub use validation::Validatable;
