//! Engine configuration for validation and iteration limits.

use serde::{Deserialize, Serialize};

/// Engine configuration shared by codemods and analysis passes.
///
/// # Defaults
///
/// - `validate_edits`: `true`
/// - `reject_parse_errors`: `false`
/// - `max_passes`: 1
///
/// Missing keys fall back to these defaults when the configuration is
/// deserialised.
///
/// # Example
///
/// ```
/// use splice_core::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.validate_edits());
/// assert_eq!(config.max_passes(), 1);
///
/// let loaded: EngineConfig = serde_json::from_str(r#"{ "max_passes": 4 }"#)?;
/// assert_eq!(loaded.max_passes(), 4);
/// assert!(loaded.validate_edits());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether edit lists are checked for ordering and overlap before they
    /// are applied.
    validate_edits: bool,
    /// Whether sources containing syntax errors are refused.
    reject_parse_errors: bool,
    /// Maximum number of times an analysis pass is re-run on its own output.
    max_passes: usize,
}

impl EngineConfig {
    /// Creates a configuration with explicit values.
    ///
    /// `max_passes` is clamped to at least one.
    #[must_use]
    pub const fn new(validate_edits: bool, reject_parse_errors: bool, max_passes: usize) -> Self {
        Self {
            validate_edits,
            reject_parse_errors,
            max_passes: if max_passes == 0 { 1 } else { max_passes },
        }
    }

    /// Returns whether edit lists are validated before application.
    #[must_use]
    pub const fn validate_edits(&self) -> bool {
        self.validate_edits
    }

    /// Returns whether sources with syntax errors are refused.
    #[must_use]
    pub const fn reject_parse_errors(&self) -> bool {
        self.reject_parse_errors
    }

    /// Returns the maximum number of passes, never less than one.
    #[must_use]
    pub const fn max_passes(&self) -> usize {
        if self.max_passes == 0 { 1 } else { self.max_passes }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_edits: true,
            reject_parse_errors: false,
            max_passes: 1,
        }
    }
}
