//! Running an analysis pass to a fixed point.

use splice_core::{CodeEdit, EngineConfig, apply_edits, validate_edits};
use splice_syntax::{Parser, SupportedLanguage, SyntaxError};
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::scope::ScopeAnalysis;

const PASS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pass");

/// Result of running an analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    output: String,
    edits_applied: usize,
    passes: usize,
}

impl AnalysisOutcome {
    /// Returns the rewritten source.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the outcome, returning the rewritten source.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Returns the number of edits applied across all passes.
    #[must_use]
    pub const fn edits_applied(&self) -> usize {
        self.edits_applied
    }

    /// Returns the number of passes run, including a final pass that found
    /// nothing to change.
    #[must_use]
    pub const fn passes(&self) -> usize {
        self.passes
    }

    /// Returns whether any edit was applied.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.edits_applied > 0
    }
}

/// Re-runs `edits_for` on its own output until it proposes no edits or
/// `config.max_passes()` passes have run.
pub(crate) fn run_passes<F>(
    name: &'static str,
    source: &str,
    config: &EngineConfig,
    mut edits_for: F,
) -> Result<AnalysisOutcome, AnalysisError>
where
    F: FnMut(&ScopeAnalysis<'_>) -> Vec<CodeEdit>,
{
    let mut parser = Parser::new(SupportedLanguage::TypeScript)?;
    let mut output = source.to_owned();
    let mut edits_applied = 0;
    let mut passes = 0;
    let mut settled = false;

    while passes < config.max_passes() {
        let parsed = parser.parse(&output)?;
        if config.reject_parse_errors() {
            parsed.ensure_clean()?;
        }
        let analysis = ScopeAnalysis::collect(&parsed)?;
        let mut edits = edits_for(&analysis);
        passes += 1;

        debug!(target: PASS_TARGET, pass = name, round = passes, edits = edits.len(), "analysis pass complete");
        if edits.is_empty() {
            settled = true;
            break;
        }
        edits.sort_by_key(|edit| edit.start_index);
        if config.validate_edits() {
            validate_edits(&edits).map_err(SyntaxError::from)?;
        }
        output = apply_edits(parsed.source(), &edits).map_err(SyntaxError::from)?;
        edits_applied += edits.len();
    }

    if !settled && config.max_passes() > 1 {
        warn!(
            target: PASS_TARGET,
            pass = name,
            max_passes = config.max_passes(),
            "pass limit reached before a fixed point"
        );
    }
    Ok(AnalysisOutcome {
        output,
        edits_applied,
        passes,
    })
}
