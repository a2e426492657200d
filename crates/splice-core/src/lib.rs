//! Plain-data model and text edit engine for the splice toolchain.
//!
//! This crate holds everything in splice that does not need a syntax tree:
//! the serialisable query wire format, byte-range code edits and the engine
//! that applies them, and the shared engine configuration. It is consumed by
//! `splice-syntax` (which compiles queries and runs them over Tree-sitter
//! trees) and by `splice-analysis`.
//!
//! # Core types
//!
//! - [`QuerySpec`] and [`SubItemSpec`]: declarative structural patterns as
//!   plain data, loadable from JSON
//! - [`CodeEdit`]: a half-open byte-range replacement
//! - [`apply_edits`] and [`validate_edits`]: the edit engine
//! - [`EngineConfig`]: validation and iteration limits
//!
//! # Example
//!
//! ```
//! use splice_core::{CodeEdit, apply_edits};
//!
//! let source = "let x = 1;\nconsole.log(x);";
//! let edits = [CodeEdit::new(11, 22, "logger.info")];
//! let output = apply_edits(source, &edits)?;
//! assert_eq!(output, "let x = 1;\nlogger.info(x);");
//! # Ok::<(), splice_core::EditError>(())
//! ```

mod config;
mod edit;
mod spec;

pub use config::EngineConfig;
pub use edit::{CodeEdit, EditError, apply_edits, validate_edits};
pub use spec::{OneOrMany, QuerySpec, Selector, SpecError, SubItemSpec, TextSpec};

#[cfg(test)]
mod tests;
