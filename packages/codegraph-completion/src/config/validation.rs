//! Configuration validation
//!
//! Code depends on the `Validatable` trait rather than concrete config types.

use super::error::ConfigResult;

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// fn build_session<C: Validatable>(config: C) -> Result<Session, ConfigError> {
///     config.validate()?;
///     // ...
/// }
/// ```
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Check that `value` lies in `min..=max`, producing a hinted range error otherwise
pub(crate) fn check_range(
    field: &str,
    value: usize,
    min: usize,
    max: usize,
    hint: &str,
) -> ConfigResult<()> {
    if value < min || value > max {
        return Err(super::ConfigError::range_with_hint(field, value, min, max, hint));
    }
    Ok(())
}
