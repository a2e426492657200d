//! Query-driven codemods: match, turn captures into edits, apply.

use splice_core::{CodeEdit, EngineConfig, apply_edits, validate_edits};
use tracing::debug;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::parser::Parser;
use crate::query::{CaptureSet, MatchAction, Query};
use crate::traverse::traverse;

const CODEMOD_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::codemod");

/// Rewrites sources by running one query and editing each match.
///
/// Each matched node's subtree is skipped, so matches never nest and the
/// edits they produce never overlap as long as each edit stays inside its
/// match.
#[derive(Debug, Clone, Default)]
pub struct Codemod {
    language: SupportedLanguage,
    config: EngineConfig,
}

impl Codemod {
    /// Creates a codemod for sources in `language`.
    #[must_use]
    pub const fn new(language: SupportedLanguage, config: EngineConfig) -> Self {
        Self { language, config }
    }

    /// Returns the language sources are parsed as.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses `source`, calls `on_capture` for every match of `query`, and
    /// applies the edits it returns.
    ///
    /// Edits are sorted by start offset before they are applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser cannot be created, the source has
    /// syntax errors and the configuration rejects them, matching fails, or
    /// the collected edits are invalid.
    pub fn run<F>(&self, source: &str, query: &Query, mut on_capture: F) -> Result<CodemodResult, SyntaxError>
    where
        F: FnMut(&CaptureSet<'_>) -> Option<CodeEdit>,
    {
        let mut parser = Parser::new(self.language)?;
        let parsed = parser.parse(source)?;
        if self.config.reject_parse_errors() {
            parsed.ensure_clean()?;
        }

        let mut edits: Vec<CodeEdit> = Vec::new();
        let mut tables = [query.dispatch_table(|collected: &mut Vec<CodeEdit>, captures: &CaptureSet<'_>| {
            collected.extend(on_capture(captures));
            Ok::<_, SyntaxError>(MatchAction::Skip)
        })];
        let visited = traverse(parsed.root(), &mut edits, &mut tables)?;

        edits.sort_by_key(|edit| edit.start_index);
        if self.config.validate_edits() {
            validate_edits(&edits)?;
        }
        let output = apply_edits(source, &edits)?;

        debug!(
            target: CODEMOD_TARGET,
            language = %self.language,
            visited,
            edits = edits.len(),
            "codemod applied"
        );
        Ok(CodemodResult {
            output,
            edits_applied: edits.len(),
        })
    }
}

/// Result of running a codemod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodemodResult {
    output: String,
    edits_applied: usize,
}

impl CodemodResult {
    /// Returns the rewritten source.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the result, returning the rewritten source.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Returns the number of edits applied.
    #[must_use]
    pub const fn edits_applied(&self) -> usize {
        self.edits_applied
    }

    /// Returns whether any edit was applied.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.edits_applied > 0
    }
}
