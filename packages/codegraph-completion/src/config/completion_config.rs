//! Engine configuration
//!
//! Budget and mode settings shared by every procedure a session analyzes.
//! Presets cover the common cases; YAML gives complete control.

use super::error::{ConfigError, ConfigResult};
use super::validation::{check_range, Validatable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI/CD: intraprocedural only
    Fast,

    /// Development: interprocedural with a shallow call chain
    Balanced,

    /// Audit: deep call chains + instance field tracking
    Thorough,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Completion engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Analyze callee bodies at call sites
    pub interprocedural: bool,

    /// Maximum call-chain depth before degrading to Unknown
    pub max_interprocedural_depth: usize,

    /// Maximum fixpoint passes over one CFG
    pub max_iterations: usize,

    /// Track `this.field` default instances as creations
    pub track_instance_fields: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl CompletionConfig {
    pub const MAX_DEPTH_LIMIT: usize = 16;
    pub const MAX_ITERATIONS_LIMIT: usize = 100_000;

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                interprocedural: false,
                max_interprocedural_depth: 1,
                max_iterations: 200,
                track_instance_fields: false,
            },
            Preset::Balanced => Self {
                interprocedural: true,
                max_interprocedural_depth: 3,
                max_iterations: 1000,
                track_instance_fields: false,
            },
            Preset::Thorough => Self {
                interprocedural: true,
                max_interprocedural_depth: 8,
                max_iterations: 10_000,
                track_instance_fields: true,
            },
        }
    }

    pub fn with_interprocedural(mut self, enabled: bool) -> Self {
        self.interprocedural = enabled;
        self
    }

    pub fn with_max_interprocedural_depth(mut self, depth: usize) -> Self {
        self.max_interprocedural_depth = depth;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_track_instance_fields(mut self, enabled: bool) -> Self {
        self.track_instance_fields = enabled;
        self
    }

    /// Parse and validate a YAML document (missing fields take defaults)
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Validatable for CompletionConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "max_interprocedural_depth",
            self.max_interprocedural_depth,
            1,
            Self::MAX_DEPTH_LIMIT,
            "Set interprocedural: false to disable callee analysis instead",
        )?;
        check_range(
            "max_iterations",
            self.max_iterations,
            1,
            Self::MAX_ITERATIONS_LIMIT,
            "Typical CFGs converge in fewer than 10 passes",
        )?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "CompletionConfig"
    }
}
