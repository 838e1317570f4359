//! Which exit states are reported

use crate::config::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionAnalysisKind {
    /// Definite and maybe violations on exception-free paths
    NonExceptionPaths,

    /// Definite violations only
    NonExceptionPathsOnlyNotCompleted,
}

impl Default for CompletionAnalysisKind {
    fn default() -> Self {
        Self::NonExceptionPaths
    }
}

impl CompletionAnalysisKind {
    const NAMES: [&'static str; 2] = ["NonExceptionPaths", "NonExceptionPathsOnlyNotCompleted"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonExceptionPaths => Self::NAMES[0],
            Self::NonExceptionPathsOnlyNotCompleted => Self::NAMES[1],
        }
    }

    /// Parse an option value (exact, case-insensitive name)
    pub fn parse(option: &str, value: &str) -> ConfigResult<Self> {
        if value.eq_ignore_ascii_case(Self::NAMES[0]) {
            Ok(Self::NonExceptionPaths)
        } else if value.eq_ignore_ascii_case(Self::NAMES[1]) {
            Ok(Self::NonExceptionPathsOnlyNotCompleted)
        } else {
            Err(ConfigError::invalid_option(option, value, &Self::NAMES))
        }
    }

    #[inline]
    pub fn are_maybe_violations_enabled(self) -> bool {
        self == Self::NonExceptionPaths
    }
}

impl fmt::Display for CompletionAnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            CompletionAnalysisKind::parse("kind", "nonexceptionpaths").unwrap(),
            CompletionAnalysisKind::NonExceptionPaths
        );
        assert!(CompletionAnalysisKind::parse("kind", "AllPaths").is_err());
    }

    #[test]
    fn test_maybe_violations_toggle() {
        assert!(CompletionAnalysisKind::default().are_maybe_violations_enabled());
        assert!(!CompletionAnalysisKind::NonExceptionPathsOnlyNotCompleted
            .are_maybe_violations_enabled());
    }
}
