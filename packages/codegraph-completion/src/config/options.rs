//! Analyzer options
//!
//! Per-procedure options come from an external key/value source (an
//! editorconfig-style file in practice). Lookup order for option `name` of
//! rule `id`:
//! 1. `dotnet_code_quality.<id>.<name>`
//! 2. `dotnet_code_quality.<name>`
//! 3. `<name>`
//!
//! Malformed values fall back to the default.

use super::error::{ConfigError, ConfigResult};
use crate::features::completion::domain::CompletionAnalysisKind;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub const OPTION_OWNERSHIP_TRANSFER_AT_CONSTRUCTOR: &str =
    "completion_ownership_transfer_at_constructor";
pub const OPTION_OWNERSHIP_TRANSFER_AT_METHOD_CALL: &str =
    "completion_ownership_transfer_at_method_call";
pub const OPTION_ANALYSIS_KIND: &str = "completion_analysis_kind";

const OPTION_PREFIX: &str = "dotnet_code_quality";

/// Key/value option source for one procedure
pub trait OptionReader: Send + Sync {
    /// Raw value for an exact key
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory option source
#[derive(Debug, Clone, Default)]
pub struct MapOptionReader {
    values: FxHashMap<String, String>,
}

impl MapOptionReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl OptionReader for MapOptionReader {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Options that steer one completion analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionOptions {
    /// Passing a target instance to a constructor transfers ownership
    pub ownership_transfer_at_constructor: bool,

    /// Passing a target instance to a method transfers ownership
    pub ownership_transfer_at_method_call: bool,

    pub analysis_kind: CompletionAnalysisKind,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            ownership_transfer_at_constructor: false,
            ownership_transfer_at_method_call: false,
            analysis_kind: CompletionAnalysisKind::NonExceptionPaths,
        }
    }
}

impl CompletionOptions {
    pub fn with_ownership_transfer_at_constructor(mut self, enabled: bool) -> Self {
        self.ownership_transfer_at_constructor = enabled;
        self
    }

    pub fn with_ownership_transfer_at_method_call(mut self, enabled: bool) -> Self {
        self.ownership_transfer_at_method_call = enabled;
        self
    }

    pub fn with_analysis_kind(mut self, kind: CompletionAnalysisKind) -> Self {
        self.analysis_kind = kind;
        self
    }

    /// Read the three options for `rule_id`, falling back to defaults
    pub fn read(reader: &dyn OptionReader, rule_id: &str) -> Self {
        let defaults = Self::default();
        Self {
            ownership_transfer_at_constructor: read_or_default(
                reader,
                rule_id,
                OPTION_OWNERSHIP_TRANSFER_AT_CONSTRUCTOR,
                defaults.ownership_transfer_at_constructor,
                parse_bool,
            ),
            ownership_transfer_at_method_call: read_or_default(
                reader,
                rule_id,
                OPTION_OWNERSHIP_TRANSFER_AT_METHOD_CALL,
                defaults.ownership_transfer_at_method_call,
                parse_bool,
            ),
            analysis_kind: read_or_default(
                reader,
                rule_id,
                OPTION_ANALYSIS_KIND,
                defaults.analysis_kind,
                CompletionAnalysisKind::parse,
            ),
        }
    }
}

fn lookup(reader: &dyn OptionReader, rule_id: &str, name: &str) -> Option<(String, String)> {
    [
        format!("{}.{}.{}", OPTION_PREFIX, rule_id, name),
        format!("{}.{}", OPTION_PREFIX, name),
        name.to_string(),
    ]
    .into_iter()
    .find_map(|key| reader.get(&key).map(|value| (key, value)))
}

fn read_or_default<T: Copy>(
    reader: &dyn OptionReader,
    rule_id: &str,
    name: &str,
    default: T,
    parse: fn(&str, &str) -> ConfigResult<T>,
) -> T {
    let Some((key, raw)) = lookup(reader, rule_id, name) else {
        return default;
    };
    match parse(name, raw.trim()) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "Ignoring malformed option");
            default
        }
    }
}

/// Parse an editorconfig boolean (`true` / `false`, case-insensitive)
pub fn parse_bool(option: &str, value: &str) -> ConfigResult<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::invalid_option(option, value, &["true", "false"]))
    }
}
