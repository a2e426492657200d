//! Error types for scope-aware analysis passes.

use splice_syntax::{SupportedLanguage, SyntaxError};
use thiserror::Error;

/// Errors from scope collection and the analysis passes built on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// A name is declared twice in the same scope.
    #[error("redeclaration of identifier `{name}` at {line}:{column}")]
    Redeclaration {
        /// The redeclared name.
        name: String,
        /// One-based line of the second declaration.
        line: u32,
        /// One-based column of the second declaration.
        column: u32,
    },

    /// The passes only understand the TypeScript/TSX grammar.
    #[error("scope analysis does not support {language} sources")]
    UnsupportedLanguage {
        /// The language of the rejected tree.
        language: SupportedLanguage,
    },

    /// Parsing, traversal, or edit application failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl AnalysisError {
    /// Creates a redeclaration error for the name at `(line, column)`.
    #[must_use]
    pub fn redeclaration(name: impl Into<String>, (line, column): (u32, u32)) -> Self {
        Self::Redeclaration {
            name: name.into(),
            line,
            column,
        }
    }

    /// Creates an unsupported language error.
    #[must_use]
    pub const fn unsupported_language(language: SupportedLanguage) -> Self {
        Self::UnsupportedLanguage { language }
    }
}
