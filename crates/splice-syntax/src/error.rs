//! Error types for parsing, query compilation, and rewriting.

use std::path::PathBuf;

use splice_core::{EditError, SpecError};
use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors from syntax-tree operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise parser for {language}: {message}")]
    ParserInitError {
        /// The language that failed to initialise.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// Failed to determine language from file path.
    #[error("could not determine language for path: {}", path.display())]
    UnknownLanguage {
        /// The path that could not be mapped to a language.
        path: PathBuf,
    },

    /// Failed to parse source code.
    #[error("failed to parse {language}: {message}")]
    ParseError {
        /// The language that failed to parse.
        language: SupportedLanguage,
        /// Description of the failure.
        message: String,
    },

    /// The source parsed with syntax errors and the configuration refuses
    /// to rewrite such sources.
    #[error("{language} source has {count} syntax error(s), first at {line}:{column}")]
    ParseRejected {
        /// The language of the rejected source.
        language: SupportedLanguage,
        /// Number of ERROR or MISSING nodes in the tree.
        count: usize,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
    },

    /// A query specification cannot be compiled.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Description of the problem.
        message: String,
    },

    /// A capture name is bound twice within one match.
    #[error("duplicate capture name: {name}")]
    DuplicateCapture {
        /// The repeated capture name.
        name: String,
    },

    /// A query specification could not be decoded.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Edits produced for a source could not be applied.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Internal error indicating a bug or system failure.
    #[error("internal error: {message}")]
    InternalError {
        /// Description of the internal error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParserInitError {
            language,
            message: message.into(),
        }
    }

    /// Creates an unknown language error.
    #[must_use]
    pub const fn unknown_language(path: PathBuf) -> Self {
        Self::UnknownLanguage { path }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: SupportedLanguage, message: impl Into<String>) -> Self {
        Self::ParseError {
            language,
            message: message.into(),
        }
    }

    /// Creates an invalid query error.
    #[must_use]
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a duplicate capture error.
    #[must_use]
    pub fn duplicate_capture(name: impl Into<String>) -> Self {
        Self::DuplicateCapture { name: name.into() }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
