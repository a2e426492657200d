//! Scope-aware simplification passes for TypeScript and TSX sources.
//!
//! The passes build on `splice-syntax`: one traversal drives several
//! dispatch tables that collect lexical scopes, bindings, identifier uses,
//! call sites, and conditionals into a [`ScopeAnalysis`]. Two rewrites are
//! computed from it:
//!
//! - [`eliminate_dead_conditionals`] replaces `if` statements and ternaries
//!   whose condition resolves to a constant with the branch that runs
//! - [`eliminate_unused_bindings`] removes variable declarators nothing
//!   refers to
//!
//! Both re-run on their own output up to [`EngineConfig::max_passes`] times
//! and report an [`AnalysisOutcome`].
//!
//! # Example
//!
//! ```ignore
//! use splice_analysis::eliminate_dead_conditionals;
//! use splice_core::EngineConfig;
//!
//! let source = "const a = true;\nif (a) {\n  const a = false;\n}";
//! let outcome = eliminate_dead_conditionals(source, &EngineConfig::default())?;
//! assert_eq!(outcome.output(), "const a = true;\n{\n  const a = false;\n}");
//! ```
//!
//! [`EngineConfig::max_passes`]: splice_core::EngineConfig::max_passes

mod collect;
mod conditionals;
mod error;
mod layout;
mod pass;
mod resolve;
mod scope;
mod unused;

pub use conditionals::eliminate_dead_conditionals;
pub use error::AnalysisError;
pub use pass::AnalysisOutcome;
pub use resolve::{BooleanResolver, Resolution};
pub use scope::{Binding, BindingId, BindingKind, Scope, ScopeAnalysis, ScopeId};
pub use unused::eliminate_unused_bindings;

#[cfg(test)]
mod tests;
