//! Tree-sitter powered structural search and rewriting for splice.
//!
//! This crate turns the plain-data pieces of `splice-core` into tools that
//! work on real syntax trees:
//!
//! - [`Parser`] and [`ParseResult`] parse sources for a [`SupportedLanguage`]
//! - [`SyntaxNode`] gives borrowed, `Copy` access to nodes and their text
//! - [`Query`] compiles a [`QuerySpec`] and matches it, yielding
//!   [`CaptureSet`]s
//! - [`traverse`] walks a tree once while driving many [`DispatchTable`]s
//! - [`Codemod`] ties the above to the edit engine
//! - [`MemoCache`] memoises per-key work such as per-file parses
//!
//! # Supported Languages
//!
//! - TypeScript and JavaScript, parsed with the TSX grammar (`.ts`, `.tsx`,
//!   `.js`, `.jsx`, and friends)
//! - Rust (`.rs`)
//! - Python (`.py`, `.pyi`)
//!
//! # Example
//!
//! ```ignore
//! use splice_core::{CodeEdit, EngineConfig, QuerySpec, SubItemSpec};
//! use splice_syntax::{Codemod, Query, SupportedLanguage};
//!
//! let query = Query::compile(
//!     &QuerySpec::new("expression_statement").with_item(
//!         SubItemSpec::kind("call_expression").with_item(
//!             SubItemSpec::field("function")
//!                 .with_text("console.log")
//!                 .with_capture("callee"),
//!         ),
//!     ),
//! )?;
//! let codemod = Codemod::new(SupportedLanguage::TypeScript, EngineConfig::default());
//! let result = codemod.run("console.log(x);", &query, |captures| {
//!     let range = captures.byte_range("callee")?;
//!     Some(CodeEdit::replace(range, "logger.info"))
//! })?;
//! assert_eq!(result.output(), "logger.info(x);");
//! ```
//!
//! [`QuerySpec`]: splice_core::QuerySpec

mod cache;
mod codemod;
mod error;
mod language;
mod node;
mod parser;
mod query;
mod traverse;

pub use cache::MemoCache;
pub use codemod::{Codemod, CodemodResult};
pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use node::{Descendants, SyntaxNode};
pub use parser::{ParseIssue, ParseResult, Parser};
pub use query::{CaptureSet, MatchAction, Query};
pub use traverse::{Deferred, DispatchTable, Visit, traverse};

#[cfg(test)]
mod tests;
